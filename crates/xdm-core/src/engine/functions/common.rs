use std::sync::Arc;

use crate::engine::collation::{Collation, resolve_collation};
use crate::engine::comparison::Comparator;
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::model::XdmNode;
use crate::xdm::{XdmAtomicValue, XdmItem, XdmSequence};

/// Atomize a sequence: nodes contribute their typed value, atomics pass through.
pub(super) fn atomize<N: XdmNode>(seq: &[XdmItem<N>]) -> Vec<XdmAtomicValue> {
    let mut out = Vec::with_capacity(seq.len());
    for item in seq {
        match item {
            XdmItem::Atomic(a) => out.push(a.clone()),
            XdmItem::Node(n) => out.extend(n.typed_value()),
        }
    }
    out
}

/// Atomize an argument declared `xs:anyAtomicType?`.
pub(super) fn opt_atomic<N: XdmNode>(
    seq: &[XdmItem<N>],
    what: &str,
) -> Result<Option<XdmAtomicValue>, Error> {
    let mut atoms = atomize(seq);
    match atoms.len() {
        0 => Ok(None),
        1 => Ok(atoms.pop()),
        n => Err(Error::from_code(
            ErrorCode::XPTY0004,
            format!("{what} expects at most one item, got {n}"),
        )),
    }
}

/// Text of a string-like atomic (`xs:string`, `xs:untypedAtomic`, `xs:anyURI`);
/// anything else is `XPTY0004`.
pub(super) fn string_like(a: &XdmAtomicValue, what: &str) -> Result<String, Error> {
    a.as_str().map(str::to_string).ok_or_else(|| {
        Error::from_code(
            ErrorCode::XPTY0004,
            format!("{what} expects xs:string, got {}", a.type_name()),
        )
    })
}

/// String value of an `xs:string?` argument; the empty sequence is `""`.
pub(super) fn opt_string<N: XdmNode>(seq: &[XdmItem<N>], what: &str) -> Result<String, Error> {
    match opt_atomic(seq, what)? {
        None => Ok(String::new()),
        Some(a) => string_like(&a, what),
    }
}

/// Collation for an optional trailing `$collation` argument.
pub(super) fn collation_arg<N: XdmNode>(
    ctx: &CallCtx<N>,
    arg: Option<&XdmSequence<N>>,
) -> Result<Arc<dyn Collation>, Error> {
    let uri = match arg {
        Some(seq) => Some(opt_string(seq, "collation")?),
        None => None,
    };
    resolve_collation(ctx.dyn_ctx, ctx.default_collation.as_ref(), uri.as_deref())
}

pub(super) fn comparator<N: XdmNode>(
    ctx: &CallCtx<N>,
    collation_arg_seq: Option<&XdmSequence<N>>,
) -> Result<Comparator, Error> {
    let collation = collation_arg(ctx, collation_arg_seq)?;
    Ok(Comparator::new(collation, ctx.dyn_ctx.implicit_timezone))
}

pub(super) fn single<N>(v: XdmAtomicValue) -> XdmSequence<N> {
    vec![XdmItem::Atomic(v)]
}

pub(super) fn optional<N>(v: Option<XdmAtomicValue>) -> XdmSequence<N> {
    v.map(XdmItem::Atomic).into_iter().collect()
}
