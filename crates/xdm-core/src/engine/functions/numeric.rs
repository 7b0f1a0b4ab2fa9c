use super::common::{atomize, comparator, opt_atomic, optional, single};
use crate::engine::aggregate;
use crate::engine::runtime::{CallCtx, Error};
use crate::engine::scalar;
use crate::xdm::XdmSequence;

pub(super) fn abs_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    _ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    match opt_atomic(&args[0], "fn:abs")? {
        None => Ok(vec![]),
        Some(v) => Ok(single(scalar::abs(&v)?)),
    }
}

pub(super) fn sum_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    _ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let seq = atomize(&args[0]);
    match args.len() {
        1 => Ok(single(aggregate::sum(&seq)?)),
        2 => {
            let zero = opt_atomic(&args[1], "fn:sum zero")?;
            Ok(optional(aggregate::sum_with_zero(&seq, zero)?))
        }
        _ => unreachable!("registry guarantees arity in range"),
    }
}

pub(super) fn avg_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    _ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(optional(aggregate::avg(&atomize(&args[0]))?))
}

pub(super) fn min_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let cmp = comparator(ctx, args.get(1))?;
    Ok(optional(aggregate::min(&atomize(&args[0]), &cmp)?))
}

pub(super) fn max_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let cmp = comparator(ctx, args.get(1))?;
    Ok(optional(aggregate::max(&atomize(&args[0]), &cmp)?))
}
