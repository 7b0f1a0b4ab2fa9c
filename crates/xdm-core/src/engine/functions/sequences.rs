use super::common::{atomize, comparator};
use crate::engine::aggregate::distinct_values;
use crate::engine::runtime::{CallCtx, Error};
use crate::xdm::{XdmItem, XdmSequence};

pub(super) fn distinct_values_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let cmp = comparator(ctx, args.get(1))?;
    let seq = atomize(&args[0]);
    Ok(distinct_values(&seq, &cmp)
        .into_iter()
        .map(XdmItem::Atomic)
        .collect())
}
