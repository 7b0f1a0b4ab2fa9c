use super::common::{atomize, single};
use crate::engine::runtime::{CallCtx, Error};
use crate::engine::scalar::ebv;
use crate::xdm::{XdmAtomicValue, XdmItem, XdmSequence};

pub(super) fn fn_true<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    _ctx: &CallCtx<N>,
    _args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(single(XdmAtomicValue::Boolean(true)))
}

pub(super) fn fn_false<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    _ctx: &CallCtx<N>,
    _args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(single(XdmAtomicValue::Boolean(false)))
}

pub(super) fn data_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let atoms = match args.len() {
        0 => atomize(&ctx.dyn_ctx.context_item_sequence()?),
        1 => atomize(&args[0]),
        _ => unreachable!("registry guarantees arity in range"),
    };
    Ok(atoms.into_iter().map(XdmItem::Atomic).collect())
}

pub(super) fn fn_not<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    _ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let b = ebv(&args[0])?;
    Ok(single(XdmAtomicValue::Boolean(!b)))
}

/// `fn:boolean($arg)`, or of the context item when called without arguments.
pub(super) fn fn_boolean<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let b = match args.len() {
        0 => ebv(&ctx.dyn_ctx.context_item_sequence()?)?,
        1 => ebv(&args[0])?,
        _ => unreachable!("registry guarantees arity in range"),
    };
    Ok(single(XdmAtomicValue::Boolean(b)))
}
