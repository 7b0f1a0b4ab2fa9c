use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use super::common::{opt_atomic, optional};
use crate::engine::casting::cast_from_lexical;
use crate::engine::numeric::{NumKind, classify};
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::xdm::{IntegerType, XdmAtomicValue, XdmSequence};

/// Local names of the non-derived `xs:` constructor functions.
pub(super) const PRIMITIVE_CONSTRUCTORS: [&str; 15] = [
    "untypedAtomic",
    "anyURI",
    "QName",
    "boolean",
    "decimal",
    "float",
    "double",
    "yearMonthDuration",
    "dayTimeDuration",
    "duration",
    "dateTime",
    "date",
    "time",
    "hexBinary",
    "base64Binary",
];

/// `xs:TYPE($arg)`: the empty sequence maps to the empty sequence.
pub(super) fn constructor_fn<N: 'static + Send + Sync + crate::model::XdmNode + Clone>(
    _ctx: &CallCtx<N>,
    args: &[XdmSequence<N>],
    target: &'static str,
) -> Result<XdmSequence<N>, Error> {
    let Some(v) = opt_atomic(&args[0], target)? else {
        return Ok(vec![]);
    };
    Ok(optional(Some(cast_atomic(&v, target)?)))
}

fn not_castable(v: &XdmAtomicValue, target: &str) -> Error {
    Error::from_code(
        ErrorCode::FORG0001,
        format!("cannot cast {} value '{v}' to xs:{target}", v.type_name()),
    )
}

fn integral(n: NumKind, v: &XdmAtomicValue, target: &str) -> Result<i128, Error> {
    match n {
        NumKind::Int(i) => Ok(i),
        NumKind::Dec(d) => d.trunc().to_i128().ok_or_else(|| not_castable(v, target)),
        NumKind::Float(_) | NumKind::Double(_) => {
            let f = n.to_f64().trunc();
            // i128 covers every integer this crate represents; larger magnitudes are rejected.
            if f.is_finite() && f.abs() < 1.7e38 {
                #[allow(clippy::cast_possible_truncation)]
                Ok(f as i128)
            } else {
                Err(not_castable(v, target))
            }
        }
    }
}

fn cast_atomic(v: &XdmAtomicValue, target: &'static str) -> Result<XdmAtomicValue, Error> {
    if let Some(s) = v.as_str() {
        return cast_from_lexical(target, s);
    }
    let Some(n) = classify(v) else {
        let lexical = match v {
            XdmAtomicValue::Boolean(b) if is_numeric_target(target) => {
                String::from(if *b { "1" } else { "0" })
            }
            other => other.to_string(),
        };
        return cast_from_lexical(target, &lexical);
    };
    if let Some(ty) = IntegerType::from_local_name(target) {
        return XdmAtomicValue::derived_integer(integral(n, v, target)?, ty);
    }
    match target {
        "decimal" => {
            let d = match n {
                NumKind::Int(i) => Decimal::from_i128(i),
                NumKind::Dec(d) => Some(d),
                NumKind::Float(_) | NumKind::Double(_) if n.is_nan() => None,
                other => Decimal::from_f64(other.to_f64()),
            };
            d.map(XdmAtomicValue::Decimal).ok_or_else(|| {
                Error::from_code(
                    ErrorCode::FOCA0001,
                    format!("value '{v}' cannot be represented as xs:decimal"),
                )
            })
        }
        "double" => Ok(XdmAtomicValue::Double(n.to_f64())),
        "float" => Ok(XdmAtomicValue::Float(n.to_f32())),
        "boolean" => Ok(XdmAtomicValue::Boolean(!n.is_nan() && !n.is_zero())),
        _ => cast_from_lexical(target, &v.to_string()),
    }
}

fn is_numeric_target(target: &str) -> bool {
    IntegerType::from_local_name(target).is_some() || matches!(target, "decimal" | "float" | "double")
}
