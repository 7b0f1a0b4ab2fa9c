//! Lexical constructors (`xs:short("7")`) and the casts comparison relies on.

use base64::Engine as _;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::consts::XS;
use crate::engine::runtime::{Error, ErrorCode};
use crate::xdm::atomic::collapse_whitespace;
use crate::xdm::{AtomicType, IntegerType, StringType, XdmAtomicValue, duration, temporal};

fn invalid(ty: &str, s: &str) -> Error {
    Error::from_code(
        ErrorCode::FORG0001,
        format!("cannot cast '{s}' to xs:{ty}"),
    )
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    }
}

pub fn parse_integer(s: &str) -> Result<i128, Error> {
    let t = s.trim();
    let (_, digits) = split_sign(t);
    if !is_digits(digits) {
        return Err(invalid("integer", s));
    }
    t.parse::<i128>().map_err(|_| invalid("integer", s))
}

/// `(+|-)?(digits(.digits?)?|.digits)`; no exponent, no special values.
pub fn parse_decimal(s: &str) -> Result<Decimal, Error> {
    let t = s.trim();
    let (neg, body) = split_sign(t);
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    let well_formed = (is_digits(int_part) || int_part.is_empty())
        && (is_digits(frac_part) || frac_part.is_empty())
        && !(int_part.is_empty() && frac_part.is_empty());
    if !well_formed {
        return Err(invalid("decimal", s));
    }
    let mut normalized = String::with_capacity(t.len() + 1);
    if neg {
        normalized.push('-');
    }
    normalized.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_part);
    }
    Decimal::from_str(&normalized).map_err(|e| {
        Error::from_code(ErrorCode::FOCA0001, format!("xs:decimal out of range: '{s}'"))
            .with_source(Some(std::sync::Arc::new(e) as std::sync::Arc<dyn std::error::Error + Send + Sync>))
    })
}

/// Checks the XML Schema float/double lexical space before handing the text to
/// Rust's parser, which would otherwise accept `inf`, `nan` and `infinity`.
fn check_float_lexical(t: &str) -> bool {
    let (_, body) = split_sign(t);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = (is_digits(int_part) || int_part.is_empty())
        && (is_digits(frac_part) || frac_part.is_empty())
        && !(int_part.is_empty() && frac_part.is_empty());
    let exponent_ok = exponent.is_none_or(|e| is_digits(split_sign(e).1));
    mantissa_ok && exponent_ok
}

pub fn parse_double(s: &str) -> Result<f64, Error> {
    let t = s.trim();
    match t {
        "NaN" => return Ok(f64::NAN),
        "INF" | "+INF" => return Ok(f64::INFINITY),
        "-INF" => return Ok(f64::NEG_INFINITY),
        _ => {}
    }
    if !check_float_lexical(t) {
        return Err(invalid("double", s));
    }
    t.parse::<f64>().map_err(|_| invalid("double", s))
}

pub fn parse_float(s: &str) -> Result<f32, Error> {
    let t = s.trim();
    match t {
        "NaN" => return Ok(f32::NAN),
        "INF" | "+INF" => return Ok(f32::INFINITY),
        "-INF" => return Ok(f32::NEG_INFINITY),
        _ => {}
    }
    if !check_float_lexical(t) {
        return Err(invalid("float", s));
    }
    t.parse::<f32>().map_err(|_| invalid("float", s))
}

pub fn parse_boolean(s: &str) -> Result<bool, Error> {
    match s.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid("boolean", s)),
    }
}

fn parse_hex(s: &str) -> Result<Vec<u8>, Error> {
    let t = s.trim();
    if t.len() % 2 != 0 || !t.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("hexBinary", s));
    }
    (0..t.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&t[i..i + 2], 16).map_err(|_| invalid("hexBinary", s)))
        .collect()
}

fn parse_base64(s: &str) -> Result<Vec<u8>, Error> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| {
            invalid("base64Binary", s)
                .with_source(Some(std::sync::Arc::new(e) as std::sync::Arc<dyn std::error::Error + Send + Sync>))
        })
}

/// `local`, `prefix:local` (no namespace) or `Q{uri}local`.
fn parse_qname(s: &str) -> Result<XdmAtomicValue, Error> {
    let t = s.trim();
    let ncname_ok = |n: &str| {
        XdmAtomicValue::derived_string(n, StringType::NcName).is_ok() && n == n.trim()
    };
    if let Some((uri, local)) = t
        .strip_prefix("Q{")
        .and_then(|rest| rest.split_once('}'))
    {
        if !ncname_ok(local) {
            return Err(invalid("QName", s));
        }
        let ns = (!uri.is_empty()).then(|| uri.to_string());
        return Ok(XdmAtomicValue::QName {
            ns_uri: ns,
            prefix: None,
            local: local.to_string(),
        });
    }
    let (prefix, local) = match t.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, t),
    };
    if !ncname_ok(local) || prefix.is_some_and(|p| !ncname_ok(p)) {
        return Err(invalid("QName", s));
    }
    Ok(XdmAtomicValue::QName {
        ns_uri: None,
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
    })
}

/// Construct an atomic value from a type name (`xs:short`, `short` or
/// `Q{http://www.w3.org/2001/XMLSchema}short`) and a lexical form.
pub fn cast_from_lexical(type_name: &str, lexical: &str) -> Result<XdmAtomicValue, Error> {
    let local = type_name
        .strip_prefix("xs:")
        .or_else(|| {
            type_name
                .strip_prefix("Q{")
                .and_then(|r| r.strip_prefix(XS))
                .and_then(|r| r.strip_prefix('}'))
        })
        .unwrap_or(type_name);
    if let Some(ty) = IntegerType::from_local_name(local) {
        return XdmAtomicValue::derived_integer(parse_integer(lexical)?, ty);
    }
    if let Some(ty) = StringType::from_local_name(local) {
        return XdmAtomicValue::derived_string(lexical, ty);
    }
    Ok(match local {
        "untypedAtomic" => XdmAtomicValue::UntypedAtomic(lexical.to_string()),
        "anyURI" => XdmAtomicValue::AnyUri(collapse_whitespace(lexical)),
        "QName" => parse_qname(lexical)?,
        "boolean" => XdmAtomicValue::Boolean(parse_boolean(lexical)?),
        "decimal" => XdmAtomicValue::Decimal(parse_decimal(lexical)?),
        "float" => XdmAtomicValue::Float(parse_float(lexical)?),
        "double" => XdmAtomicValue::Double(parse_double(lexical)?),
        "yearMonthDuration" => {
            XdmAtomicValue::YearMonthDuration(duration::parse_year_month_duration(lexical)?)
        }
        "dayTimeDuration" => {
            XdmAtomicValue::DayTimeDuration(duration::parse_day_time_duration(lexical)?)
        }
        "duration" => {
            let (months, time) = duration::parse_duration(lexical)?;
            XdmAtomicValue::Duration { months, time }
        }
        "dateTime" => {
            let (value, tz) = temporal::parse_date_time(lexical)?;
            XdmAtomicValue::DateTime { value, tz }
        }
        "date" => {
            let (date, tz) = temporal::parse_date(lexical)?;
            XdmAtomicValue::Date { date, tz }
        }
        "time" => {
            let (time, tz) = temporal::parse_time(lexical)?;
            XdmAtomicValue::Time { time, tz }
        }
        "hexBinary" => XdmAtomicValue::HexBinary(parse_hex(lexical)?),
        "base64Binary" => XdmAtomicValue::Base64Binary(parse_base64(lexical)?),
        _ => {
            return Err(Error::from_code(
                ErrorCode::XPST0017,
                format!("no constructor function for type {type_name}"),
            ));
        }
    })
}

/// Cast a text value to the primitive kind `target`.
pub fn cast_text_to(text: &str, target: AtomicType) -> Result<XdmAtomicValue, Error> {
    cast_from_lexical(target.local_name(), text)
}

/// `xs:untypedAtomic` in a numeric context becomes `xs:double`.
pub fn untyped_to_double(text: &str) -> Result<XdmAtomicValue, Error> {
    parse_double(text).map(XdmAtomicValue::Double)
}
