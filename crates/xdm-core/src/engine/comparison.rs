//! Atomic value comparison under an explicit collation.
//!
//! [`Comparator::compare`] is the ordering primitive the aggregates build on:
//! it yields `Some(ordering)`, `None` when a NaN makes the pair unordered, or
//! `FORG0006` when the kinds cannot be ordered against each other.
//! [`Comparator::compare_op`] layers the value comparison operators on top.

use core::cmp::Ordering;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};

use crate::engine::casting::{cast_text_to, untyped_to_double};
use crate::engine::collation::{Collation, codepoint};
use crate::engine::numeric::{classify, compare_numeric};
use crate::engine::runtime::{Error, ErrorCode};
use crate::xdm::{XdmAtomicValue, duration, temporal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
        }
    }

    pub fn is_ordering(self) -> bool {
        !matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }

    /// Apply the operator to an ordering; `None` (NaN) satisfies only `ne`.
    pub fn holds(self, ord: Option<Ordering>) -> bool {
        match ord {
            None => self == ComparisonOp::Ne,
            Some(o) => match self {
                ComparisonOp::Eq => o.is_eq(),
                ComparisonOp::Ne => o.is_ne(),
                ComparisonOp::Lt => o.is_lt(),
                ComparisonOp::Le => o.is_le(),
                ComparisonOp::Gt => o.is_gt(),
                ComparisonOp::Ge => o.is_ge(),
            },
        }
    }
}

/// How two atomic values relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Ordered(Ordering),
    /// Numeric pair with a NaN operand.
    Unordered,
    /// Kinds with equality but no order (QName, mixed or general durations).
    EqualityOnly(bool),
    Incomparable,
}

#[derive(Clone)]
pub struct Comparator {
    collation: Arc<dyn Collation>,
    implicit_timezone: FixedOffset,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(codepoint(), Utc.fix())
    }
}

impl Comparator {
    pub fn new(collation: Arc<dyn Collation>, implicit_timezone: FixedOffset) -> Self {
        Self {
            collation,
            implicit_timezone,
        }
    }

    pub fn collation(&self) -> &Arc<dyn Collation> {
        &self.collation
    }

    pub fn implicit_timezone(&self) -> FixedOffset {
        self.implicit_timezone
    }

    /// Ordering of `a` and `b`; `None` if a NaN leaves them unordered.
    pub fn compare(&self, a: &XdmAtomicValue, b: &XdmAtomicValue) -> Result<Option<Ordering>, Error> {
        match self.outcome(a, b)? {
            Outcome::Ordered(o) => Ok(Some(o)),
            Outcome::Unordered => Ok(None),
            Outcome::EqualityOnly(_) | Outcome::Incomparable => Err(Error::from_code(
                ErrorCode::FORG0006,
                format!("cannot order {} against {}", a.type_name(), b.type_name()),
            )),
        }
    }

    /// Typed-value equality (`eq`): NaN equals nothing, not even NaN.
    pub fn equal(&self, a: &XdmAtomicValue, b: &XdmAtomicValue) -> Result<bool, Error> {
        self.compare_op(a, ComparisonOp::Eq, b)
    }

    /// Value comparison `a op b`.
    pub fn compare_op(
        &self,
        a: &XdmAtomicValue,
        op: ComparisonOp,
        b: &XdmAtomicValue,
    ) -> Result<bool, Error> {
        match self.outcome(a, b)? {
            Outcome::Ordered(o) => Ok(op.holds(Some(o))),
            Outcome::Unordered => Ok(op.holds(None)),
            Outcome::EqualityOnly(eq) if !op.is_ordering() => Ok((op == ComparisonOp::Eq) == eq),
            Outcome::EqualityOnly(_) | Outcome::Incomparable => Err(Error::from_code(
                ErrorCode::XPTY0004,
                format!(
                    "cannot compare {} {} {}",
                    a.type_name(),
                    op.symbol(),
                    b.type_name()
                ),
            )),
        }
    }

    /// Resolve `xs:untypedAtomic` operands against the other side, then relate.
    pub(crate) fn outcome(&self, a: &XdmAtomicValue, b: &XdmAtomicValue) -> Result<Outcome, Error> {
        use XdmAtomicValue as V;
        match (a, b) {
            (V::UntypedAtomic(x), V::UntypedAtomic(y)) => Ok(self.strings(x, y)),
            (V::UntypedAtomic(s), other) => {
                let cast = Self::cast_untyped(s, other)?;
                Ok(self.relate(&cast, other))
            }
            (other, V::UntypedAtomic(s)) => {
                let cast = Self::cast_untyped(s, other)?;
                Ok(self.relate(other, &cast))
            }
            _ => Ok(self.relate(a, b)),
        }
    }

    fn cast_untyped(text: &str, other: &XdmAtomicValue) -> Result<XdmAtomicValue, Error> {
        if other.is_numeric() {
            untyped_to_double(text)
        } else if other.as_str().is_some() {
            Ok(XdmAtomicValue::string(text))
        } else {
            cast_text_to(text, other.atomic_type())
        }
    }

    fn strings(&self, a: &str, b: &str) -> Outcome {
        Outcome::Ordered(self.collation.compare(a, b))
    }

    fn instant(&self, local: NaiveDateTime, tz: Option<FixedOffset>) -> NaiveDateTime {
        temporal::to_utc(local, tz, self.implicit_timezone)
    }

    fn relate(&self, a: &XdmAtomicValue, b: &XdmAtomicValue) -> Outcome {
        use XdmAtomicValue as V;
        if let (Some(x), Some(y)) = (classify(a), classify(b)) {
            return compare_numeric(x, y).map_or(Outcome::Unordered, Outcome::Ordered);
        }
        match (a, b) {
            (
                V::String { value: x, .. } | V::AnyUri(x) | V::UntypedAtomic(x),
                V::String { value: y, .. } | V::AnyUri(y) | V::UntypedAtomic(y),
            ) => self.strings(x, y),
            (V::Boolean(x), V::Boolean(y)) => Outcome::Ordered(x.cmp(y)),
            (V::YearMonthDuration(x), V::YearMonthDuration(y)) => Outcome::Ordered(x.cmp(y)),
            (V::DayTimeDuration(x), V::DayTimeDuration(y)) => Outcome::Ordered(x.cmp(y)),
            (
                V::YearMonthDuration(_) | V::DayTimeDuration(_) | V::Duration { .. },
                V::YearMonthDuration(_) | V::DayTimeDuration(_) | V::Duration { .. },
            ) => Outcome::EqualityOnly(duration_parts(a) == duration_parts(b)),
            (V::DateTime { value: x, tz: tx }, V::DateTime { value: y, tz: ty }) => {
                Outcome::Ordered(self.instant(*x, *tx).cmp(&self.instant(*y, *ty)))
            }
            (V::Date { date: x, tz: tx }, V::Date { date: y, tz: ty }) => {
                let (x, y) = (x.and_time(chrono::NaiveTime::MIN), y.and_time(chrono::NaiveTime::MIN));
                Outcome::Ordered(self.instant(x, *tx).cmp(&self.instant(y, *ty)))
            }
            (V::Time { time: x, tz: tx }, V::Time { time: y, tz: ty }) => {
                let day = temporal::time_reference_date();
                let (x, y) = (day.and_time(*x), day.and_time(*y));
                Outcome::Ordered(self.instant(x, *tx).cmp(&self.instant(y, *ty)))
            }
            (
                V::QName {
                    ns_uri: nx,
                    local: lx,
                    ..
                },
                V::QName {
                    ns_uri: ny,
                    local: ly,
                    ..
                },
            ) => Outcome::EqualityOnly(nx == ny && lx == ly),
            (V::HexBinary(x), V::HexBinary(y)) | (V::Base64Binary(x), V::Base64Binary(y)) => {
                Outcome::Ordered(x.cmp(y))
            }
            _ => Outcome::Incomparable,
        }
    }
}

/// `(months, nanoseconds)` of any duration kind.
pub(crate) fn duration_parts(v: &XdmAtomicValue) -> Option<(i64, i128)> {
    match v {
        XdmAtomicValue::YearMonthDuration(m) => Some((*m, 0)),
        XdmAtomicValue::DayTimeDuration(d) => Some((0, duration::total_nanos(*d))),
        XdmAtomicValue::Duration { months, time } => Some((*months, duration::total_nanos(*time))),
        _ => None,
    }
}
