//! Sequence reducers: `fn:min`, `fn:max`, `fn:sum`, `fn:avg`, `fn:distinct-values`.
//!
//! Each reducer walks its (already atomized) input once, left to right, and
//! stops at the first error.

use core::cmp::Ordering;

use chrono::TimeDelta;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::engine::casting::untyped_to_double;
use crate::engine::comparison::Comparator;
use crate::engine::eq::DistinctSet;
use crate::engine::numeric::{NumKind, NumericKind, add_numeric, classify};
use crate::engine::runtime::{Error, ErrorCode};
use crate::xdm::{XdmAtomicValue, duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Min,
    Max,
}

pub fn min(seq: &[XdmAtomicValue], cmp: &Comparator) -> Result<Option<XdmAtomicValue>, Error> {
    extreme(seq, cmp, Extreme::Min)
}

pub fn max(seq: &[XdmAtomicValue], cmp: &Comparator) -> Result<Option<XdmAtomicValue>, Error> {
    extreme(seq, cmp, Extreme::Max)
}

fn untyped_as_double(v: &XdmAtomicValue) -> Result<XdmAtomicValue, Error> {
    match v {
        XdmAtomicValue::UntypedAtomic(s) => untyped_to_double(s),
        other => Ok(other.clone()),
    }
}

fn extreme(
    seq: &[XdmAtomicValue],
    cmp: &Comparator,
    which: Extreme,
) -> Result<Option<XdmAtomicValue>, Error> {
    let mut acc: Option<XdmAtomicValue> = None;
    let mut rank: Option<NumericKind> = None;
    let mut saw_string = false;
    for item in seq {
        let v = untyped_as_double(item)?;
        if let Some(k) = NumericKind::of(&v) {
            rank = Some(rank.map_or(k, |r| r.promote(k)));
        }
        saw_string |= matches!(v, XdmAtomicValue::String { .. });
        let Some(cur) = acc.as_ref() else {
            // A lone item still has to be orderable (QName, xs:duration are not).
            cmp.compare(&v, &v)?;
            acc = Some(v);
            continue;
        };
        // Comparability is checked on every step, also after a NaN was seen.
        let ord = cmp.compare(cur, &v)?;
        if cur.is_nan() {
            continue;
        }
        let replace = v.is_nan()
            || matches!(
                (which, ord),
                (Extreme::Min, Some(Ordering::Greater)) | (Extreme::Max, Some(Ordering::Less))
            );
        if replace {
            acc = Some(v);
        }
    }
    let Some(winner) = acc else {
        return Ok(None);
    };
    Ok(Some(match (rank, classify(&winner)) {
        (Some(r), Some(n)) if r != n.kind() => n.promote_to(r).into_atomic(),
        _ if saw_string => match winner {
            XdmAtomicValue::AnyUri(s) => XdmAtomicValue::string(s),
            other => other,
        },
        _ => winner,
    }))
}

/// Running sum; the variant is fixed by the first item.
enum SumState {
    Numeric(NumKind),
    YearMonth(i64),
    DayTime(TimeDelta),
}

fn not_summable(v: &XdmAtomicValue) -> Error {
    Error::from_code(
        ErrorCode::FORG0006,
        format!("{} cannot be summed", v.type_name()),
    )
}

fn mixed(a: &str, b: &XdmAtomicValue) -> Error {
    Error::from_code(
        ErrorCode::FORG0006,
        format!("cannot add {} to a sum of {a}", b.type_name()),
    )
}

fn overflow(what: &str) -> Error {
    Error::from_code(ErrorCode::FOAR0002, format!("overflow in {what}"))
}

impl SumState {
    fn start(v: &XdmAtomicValue) -> Result<Self, Error> {
        if let Some(n) = classify(v) {
            return Ok(SumState::Numeric(n));
        }
        match v {
            XdmAtomicValue::YearMonthDuration(m) => Ok(SumState::YearMonth(*m)),
            XdmAtomicValue::DayTimeDuration(d) => Ok(SumState::DayTime(*d)),
            other => Err(not_summable(other)),
        }
    }

    fn add(self, v: &XdmAtomicValue) -> Result<Self, Error> {
        match (self, v) {
            (SumState::Numeric(acc), other) => match classify(other) {
                Some(n) => Ok(SumState::Numeric(add_numeric(acc, n)?)),
                None if SumState::start(other).is_ok() => Err(mixed("numbers", other)),
                None => Err(not_summable(other)),
            },
            (SumState::YearMonth(acc), XdmAtomicValue::YearMonthDuration(m)) => acc
                .checked_add(*m)
                .map(SumState::YearMonth)
                .ok_or_else(|| overflow("xs:yearMonthDuration sum")),
            (SumState::DayTime(acc), XdmAtomicValue::DayTimeDuration(d)) => acc
                .checked_add(d)
                .map(SumState::DayTime)
                .ok_or_else(|| overflow("xs:dayTimeDuration sum")),
            (SumState::YearMonth(_), other) if SumState::start(other).is_ok() => {
                Err(mixed("xs:yearMonthDuration", other))
            }
            (SumState::DayTime(_), other) if SumState::start(other).is_ok() => {
                Err(mixed("xs:dayTimeDuration", other))
            }
            (_, other) => Err(not_summable(other)),
        }
    }

    fn into_atomic(self) -> XdmAtomicValue {
        match self {
            SumState::Numeric(n) => n.into_atomic(),
            SumState::YearMonth(m) => XdmAtomicValue::YearMonthDuration(m),
            SumState::DayTime(d) => XdmAtomicValue::DayTimeDuration(d),
        }
    }
}

/// Fold the sequence; returns the state and the item count, or `None` if empty.
fn accumulate(seq: &[XdmAtomicValue]) -> Result<Option<(SumState, usize)>, Error> {
    let mut state: Option<SumState> = None;
    for item in seq {
        let v = untyped_as_double(item)?;
        state = Some(match state {
            None => SumState::start(&v)?,
            Some(s) => s.add(&v)?,
        });
    }
    Ok(state.map(|s| (s, seq.len())))
}

/// `fn:sum($seq)`: the empty sequence sums to `xs:integer(0)`.
pub fn sum(seq: &[XdmAtomicValue]) -> Result<XdmAtomicValue, Error> {
    let zero = XdmAtomicValue::integer(0);
    Ok(sum_with_zero(seq, Some(zero.clone()))?.unwrap_or(zero))
}

/// `fn:sum($seq, $zero)`: `zero` is returned unchanged for empty input
/// (`None` stands for an empty `$zero`). A single item keeps its own type.
pub fn sum_with_zero(
    seq: &[XdmAtomicValue],
    zero: Option<XdmAtomicValue>,
) -> Result<Option<XdmAtomicValue>, Error> {
    if let [only] = seq {
        let v = untyped_as_double(only)?;
        SumState::start(&v)?;
        return Ok(Some(v));
    }
    Ok(match accumulate(seq)? {
        Some((state, _)) => Some(state.into_atomic()),
        None => zero,
    })
}

/// `fn:avg`: empty input is empty; integer means are returned as `xs:decimal`.
pub fn avg(seq: &[XdmAtomicValue]) -> Result<Option<XdmAtomicValue>, Error> {
    let Some((state, count)) = accumulate(seq)? else {
        return Ok(None);
    };
    let divide_error = || Error::from_code(ErrorCode::FOAR0002, "overflow in fn:avg");
    Ok(Some(match state {
        SumState::Numeric(total) => {
            let n = NumKind::Int(count as i128);
            match total.promote_to(NumericKind::Decimal) {
                NumKind::Dec(d) => {
                    let divisor = Decimal::from_usize(count).ok_or_else(divide_error)?;
                    XdmAtomicValue::Decimal(d.checked_div(divisor).ok_or_else(divide_error)?.normalize())
                }
                NumKind::Float(f) => XdmAtomicValue::Float(f / n.to_f32()),
                other => XdmAtomicValue::Double(other.to_f64() / n.to_f64()),
            }
        }
        SumState::YearMonth(months) => {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let mean = (months as f64 / count as f64).round() as i64;
            XdmAtomicValue::YearMonthDuration(mean)
        }
        SumState::DayTime(total) => {
            let nanos = duration::total_nanos(total) / count as i128;
            let secs = i64::try_from(nanos / 1_000_000_000).map_err(|_| divide_error())?;
            let sub = i64::try_from(nanos % 1_000_000_000).map_err(|_| divide_error())?;
            let d = TimeDelta::try_seconds(secs)
                .and_then(|s| s.checked_add(&TimeDelta::nanoseconds(sub)))
                .ok_or_else(divide_error)?;
            XdmAtomicValue::DayTimeDuration(d)
        }
    }))
}

/// `fn:distinct-values`: first occurrences, in input order.
pub fn distinct_values(seq: &[XdmAtomicValue], cmp: &Comparator) -> Vec<XdmAtomicValue> {
    let mut seen = DistinctSet::new(cmp);
    seq.iter().filter(|v| seen.insert(v)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untyped_in_min_must_be_numeric() {
        let cmp = Comparator::default();
        let err = min(&[XdmAtomicValue::untyped("one")], &cmp).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::FORG0001);
    }

    #[test]
    fn day_time_sum() {
        let seq = [
            XdmAtomicValue::DayTimeDuration(TimeDelta::days(1)),
            XdmAtomicValue::DayTimeDuration(TimeDelta::hours(1)),
        ];
        assert_eq!(
            sum(&seq).unwrap(),
            XdmAtomicValue::DayTimeDuration(TimeDelta::hours(25))
        );
    }

    #[test]
    fn avg_of_integers_is_decimal() {
        let seq = [XdmAtomicValue::integer(1), XdmAtomicValue::integer(2)];
        assert_eq!(
            avg(&seq).unwrap(),
            Some(XdmAtomicValue::Decimal(Decimal::new(15, 1)))
        );
    }
}
