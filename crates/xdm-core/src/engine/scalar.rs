//! Single-value functions: `fn:abs`, effective boolean value, and the
//! collation-aware substring family.

use core::cmp::Ordering;

use crate::engine::casting::untyped_to_double;
use crate::engine::collation::Collation;
use crate::engine::numeric::{NumKind, classify};
use crate::engine::runtime::{Error, ErrorCode};
use crate::xdm::{XdmAtomicValue, XdmItem};

/// `fn:abs`. Integer facets collapse to plain `xs:integer`; `-0` becomes `0`.
pub fn abs(v: &XdmAtomicValue) -> Result<XdmAtomicValue, Error> {
    let v = match v {
        XdmAtomicValue::UntypedAtomic(s) => untyped_to_double(s)?,
        other => other.clone(),
    };
    let Some(n) = classify(&v) else {
        return Err(Error::from_code(
            ErrorCode::XPTY0004,
            format!("fn:abs expects a numeric argument, got {}", v.type_name()),
        ));
    };
    Ok(match n {
        NumKind::Int(i) => NumKind::Int(i.checked_abs().ok_or_else(|| {
            Error::from_code(ErrorCode::FOAR0002, "overflow in fn:abs")
        })?),
        NumKind::Dec(d) => NumKind::Dec(d.abs()),
        NumKind::Float(f) => NumKind::Float(f.abs()),
        NumKind::Double(d) => NumKind::Double(d.abs()),
    }
    .into_atomic())
}

fn ebv_error(msg: impl Into<String>) -> Error {
    Error::from_code(ErrorCode::FORG0006, msg)
}

/// Effective boolean value of a sequence.
pub fn ebv<N>(seq: &[XdmItem<N>]) -> Result<bool, Error> {
    let first = match seq {
        [] => return Ok(false),
        [XdmItem::Node(_), ..] => return Ok(true),
        [first] => first,
        [_, _, ..] => {
            return Err(ebv_error(
                "effective boolean value of a sequence of more than one atomic item",
            ));
        }
    };
    let XdmItem::Atomic(a) = first else {
        return Ok(true);
    };
    match a {
        XdmAtomicValue::Boolean(b) => Ok(*b),
        XdmAtomicValue::String { value, .. }
        | XdmAtomicValue::UntypedAtomic(value)
        | XdmAtomicValue::AnyUri(value) => Ok(!value.is_empty()),
        other => match classify(other) {
            Some(n) => Ok(!n.is_nan() && !n.is_zero()),
            None => Err(ebv_error(format!(
                "effective boolean value not defined for {}",
                other.type_name()
            ))),
        },
    }
}

/// Prefix of `s` before the first match of `search`; empty when there is no
/// match or `search` is empty.
pub fn substring_before(s: &str, search: &str, collation: &dyn Collation) -> String {
    if s.is_empty() || search.is_empty() {
        return String::new();
    }
    match collation.find(s, search) {
        Some((start, _)) => s[..start].to_string(),
        None => String::new(),
    }
}

/// Suffix of `s` after the first match of `search`; all of `s` when `search`
/// is empty.
pub fn substring_after(s: &str, search: &str, collation: &dyn Collation) -> String {
    if search.is_empty() {
        return s.to_string();
    }
    match collation.find(s, search) {
        Some((_, end)) => s[end..].to_string(),
        None => String::new(),
    }
}

pub fn contains(s: &str, search: &str, collation: &dyn Collation) -> bool {
    search.is_empty() || collation.contains(s, search)
}

pub fn starts_with(s: &str, search: &str, collation: &dyn Collation) -> bool {
    search.is_empty() || collation.starts_with(s, search)
}

pub fn ends_with(s: &str, search: &str, collation: &dyn Collation) -> bool {
    search.is_empty() || collation.ends_with(s, search)
}

/// `fn:compare` as `-1`, `0` or `1`.
pub fn compare_strings(a: &str, b: &str, collation: &dyn Collation) -> i64 {
    match collation.compare(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}
