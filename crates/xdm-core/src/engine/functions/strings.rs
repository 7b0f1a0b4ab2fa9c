use super::common::{collation_arg, opt_atomic, opt_string, single, string_like};
use crate::engine::runtime::{CallCtx, Error};
use crate::engine::scalar;
use crate::xdm::{XdmAtomicValue, XdmSequence};

pub(super) fn substring_before_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let s = opt_string(&args[0], "fn:substring-before")?;
    let search = opt_string(&args[1], "fn:substring-before")?;
    let coll = collation_arg(ctx, args.get(2))?;
    Ok(single(XdmAtomicValue::string(scalar::substring_before(
        &s,
        &search,
        coll.as_ref(),
    ))))
}

pub(super) fn substring_after_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let s = opt_string(&args[0], "fn:substring-after")?;
    let search = opt_string(&args[1], "fn:substring-after")?;
    let coll = collation_arg(ctx, args.get(2))?;
    Ok(single(XdmAtomicValue::string(scalar::substring_after(
        &s,
        &search,
        coll.as_ref(),
    ))))
}

pub(super) fn contains_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let s = opt_string(&args[0], "fn:contains")?;
    let search = opt_string(&args[1], "fn:contains")?;
    let coll = collation_arg(ctx, args.get(2))?;
    Ok(single(XdmAtomicValue::Boolean(scalar::contains(
        &s,
        &search,
        coll.as_ref(),
    ))))
}

pub(super) fn starts_with_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let s = opt_string(&args[0], "fn:starts-with")?;
    let search = opt_string(&args[1], "fn:starts-with")?;
    let coll = collation_arg(ctx, args.get(2))?;
    Ok(single(XdmAtomicValue::Boolean(scalar::starts_with(
        &s,
        &search,
        coll.as_ref(),
    ))))
}

pub(super) fn ends_with_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let s = opt_string(&args[0], "fn:ends-with")?;
    let search = opt_string(&args[1], "fn:ends-with")?;
    let coll = collation_arg(ctx, args.get(2))?;
    Ok(single(XdmAtomicValue::Boolean(scalar::ends_with(
        &s,
        &search,
        coll.as_ref(),
    ))))
}

/// Empty if either operand is empty.
pub(super) fn compare_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let (Some(a), Some(b)) = (
        opt_atomic(&args[0], "fn:compare")?,
        opt_atomic(&args[1], "fn:compare")?,
    ) else {
        return Ok(vec![]);
    };
    let a = string_like(&a, "fn:compare")?;
    let b = string_like(&b, "fn:compare")?;
    let coll = collation_arg(ctx, args.get(2))?;
    let r = scalar::compare_strings(&a, &b, coll.as_ref());
    Ok(single(XdmAtomicValue::integer(i128::from(r))))
}
