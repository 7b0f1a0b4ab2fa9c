//! Numeric classification and promotion.
//!
//! [`NumericKind`] is the pure rank tag (`Integer < Decimal < Float < Double`)
//! and [`NumKind`] carries a value of that rank. Every widening goes through
//! [`NumKind::to_f64`], so values that compare equal after promotion always
//! share the same `f32` image (used for hashing in `engine::eq`).

use core::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::engine::runtime::{Error, ErrorCode};
use crate::xdm::{IntegerType, XdmAtomicValue};

/// Pure numeric rank without a carried value. Variant order is the promotion order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericKind {
    Integer,
    Decimal,
    Float,
    Double,
}

impl NumericKind {
    /// Common rank of two operands: the higher of the two.
    #[must_use]
    pub fn promote(self, other: NumericKind) -> NumericKind {
        self.max(other)
    }

    pub fn of(v: &XdmAtomicValue) -> Option<NumericKind> {
        classify(v).map(NumKind::kind)
    }

    pub fn local_name(self) -> &'static str {
        match self {
            NumericKind::Integer => "integer",
            NumericKind::Decimal => "decimal",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
        }
    }
}

/// Numeric value tagged with its promotion rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumKind {
    Int(i128),
    Dec(Decimal),
    Float(f32),
    Double(f64),
}

impl NumKind {
    pub fn kind(self) -> NumericKind {
        match self {
            NumKind::Int(_) => NumericKind::Integer,
            NumKind::Dec(_) => NumericKind::Decimal,
            NumKind::Float(_) => NumericKind::Float,
            NumKind::Double(_) => NumericKind::Double,
        }
    }

    /// Widen to `f64`. Integral decimals go through `i128` so they land on the
    /// same double as the equal integer.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        match self {
            NumKind::Int(i) => i as f64,
            NumKind::Dec(d) => {
                if d.fract().is_zero()
                    && let Some(i) = d.to_i128()
                {
                    i as f64
                } else {
                    d.normalize().to_f64().unwrap_or(f64::NAN)
                }
            }
            NumKind::Float(f) => f64::from(f),
            NumKind::Double(d) => d,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(self) -> f32 {
        match self {
            NumKind::Float(f) => f,
            other => other.to_f64() as f32,
        }
    }

    pub fn is_nan(self) -> bool {
        match self {
            NumKind::Float(f) => f.is_nan(),
            NumKind::Double(d) => d.is_nan(),
            _ => false,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            NumKind::Int(i) => i == 0,
            NumKind::Dec(d) => d.is_zero(),
            NumKind::Float(f) => f == 0.0,
            NumKind::Double(d) => d == 0.0,
        }
    }

    /// Widen to `target` (never narrows). An integer outside the decimal range
    /// is carried as a double instead.
    #[must_use]
    pub fn promote_to(self, target: NumericKind) -> NumKind {
        if target <= self.kind() {
            return self;
        }
        match target {
            NumericKind::Integer => self,
            NumericKind::Decimal => match self {
                NumKind::Int(i) => Decimal::from_i128(i).map_or(NumKind::Double(self.to_f64()), NumKind::Dec),
                other => other,
            },
            NumericKind::Float => NumKind::Float(self.to_f32()),
            NumericKind::Double => NumKind::Double(self.to_f64()),
        }
    }

    pub fn into_atomic(self) -> XdmAtomicValue {
        match self {
            NumKind::Int(i) => XdmAtomicValue::Integer {
                value: i,
                ty: IntegerType::Integer,
            },
            NumKind::Dec(d) => XdmAtomicValue::Decimal(d),
            NumKind::Float(f) => XdmAtomicValue::Float(f),
            NumKind::Double(d) => XdmAtomicValue::Double(d),
        }
    }
}

/// Classify an XDM atomic value into a [`NumKind`], if it is numeric.
/// Integer facets all classify as `Int`.
pub fn classify(v: &XdmAtomicValue) -> Option<NumKind> {
    match v {
        XdmAtomicValue::Integer { value, .. } => Some(NumKind::Int(*value)),
        XdmAtomicValue::Decimal(d) => Some(NumKind::Dec(*d)),
        XdmAtomicValue::Float(f) => Some(NumKind::Float(*f)),
        XdmAtomicValue::Double(d) => Some(NumKind::Double(*d)),
        _ => None,
    }
}

/// Promote two values to their common rank.
pub fn unify_numeric(a: NumKind, b: NumKind) -> (NumKind, NumKind) {
    let target = a.kind().promote(b.kind());
    let (a, b) = (a.promote_to(target), b.promote_to(target));
    // An oversized integer may have fallen back to double on one side only.
    if a.kind() == b.kind() {
        (a, b)
    } else {
        let wide = a.kind().promote(b.kind());
        (a.promote_to(wide), b.promote_to(wide))
    }
}

/// Compare after promotion. `None` when either side is NaN.
pub fn compare_numeric(a: NumKind, b: NumKind) -> Option<Ordering> {
    match unify_numeric(a, b) {
        (NumKind::Int(x), NumKind::Int(y)) => Some(x.cmp(&y)),
        (NumKind::Dec(x), NumKind::Dec(y)) => Some(x.cmp(&y)),
        (NumKind::Float(x), NumKind::Float(y)) => x.partial_cmp(&y),
        (x, y) => x.to_f64().partial_cmp(&y.to_f64()),
    }
}

fn overflow(what: &str) -> Error {
    Error::from_code(ErrorCode::FOAR0002, format!("numeric overflow in {what}"))
}

/// Promoted addition. Integer and decimal overflow raise `FOAR0002`;
/// float and double follow IEEE (overflow to infinity).
pub fn add_numeric(a: NumKind, b: NumKind) -> Result<NumKind, Error> {
    Ok(match unify_numeric(a, b) {
        (NumKind::Int(x), NumKind::Int(y)) => {
            NumKind::Int(x.checked_add(y).ok_or_else(|| overflow("xs:integer addition"))?)
        }
        (NumKind::Dec(x), NumKind::Dec(y)) => {
            NumKind::Dec(x.checked_add(y).ok_or_else(|| overflow("xs:decimal addition"))?)
        }
        (NumKind::Float(x), NumKind::Float(y)) => NumKind::Float(x + y),
        (x, y) => NumKind::Double(x.to_f64() + y.to_f64()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_is_max_rank() {
        assert_eq!(NumericKind::Integer.promote(NumericKind::Decimal), NumericKind::Decimal);
        assert_eq!(NumericKind::Float.promote(NumericKind::Decimal), NumericKind::Float);
        assert_eq!(NumericKind::Double.promote(NumericKind::Float), NumericKind::Double);
        assert_eq!(NumericKind::Integer.promote(NumericKind::Integer), NumericKind::Integer);
    }

    #[test]
    fn integer_beyond_decimal_range_compares_as_double() {
        let big = NumKind::Int(i128::MAX);
        let d = NumKind::Dec(Decimal::ONE);
        assert_eq!(compare_numeric(big, d), Some(Ordering::Greater));
    }

    #[test]
    fn integer_overflow_is_reported() {
        let err = add_numeric(NumKind::Int(i128::MAX), NumKind::Int(1)).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::FOAR0002);
    }

    #[test]
    fn double_overflow_is_infinite() {
        let r = add_numeric(NumKind::Double(f64::MAX), NumKind::Double(f64::MAX)).unwrap();
        assert_eq!(r, NumKind::Double(f64::INFINITY));
    }
}
