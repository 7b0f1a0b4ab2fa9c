//! The closed XDM atomic value universe.
//!
//! Every value carries exactly one primitive kind ([`AtomicType`]). Derived
//! numeric and string types are facet tags ([`IntegerType`], [`StringType`])
//! stored next to the primitive payload: construction validates them once,
//! comparison/promotion/arithmetic never look at them, and they are only
//! reported back through [`XdmAtomicValue::type_name`].

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use core::fmt;
use rust_decimal::Decimal;

use crate::engine::runtime::{Error, ErrorCode};

/// Integer facets layered on `xs:integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    PositiveInteger,
}

impl IntegerType {
    pub const ALL: [IntegerType; 13] = [
        IntegerType::Integer,
        IntegerType::NonPositiveInteger,
        IntegerType::NegativeInteger,
        IntegerType::Long,
        IntegerType::Int,
        IntegerType::Short,
        IntegerType::Byte,
        IntegerType::NonNegativeInteger,
        IntegerType::UnsignedLong,
        IntegerType::UnsignedInt,
        IntegerType::UnsignedShort,
        IntegerType::UnsignedByte,
        IntegerType::PositiveInteger,
    ];

    pub fn local_name(self) -> &'static str {
        match self {
            IntegerType::Integer => "integer",
            IntegerType::NonPositiveInteger => "nonPositiveInteger",
            IntegerType::NegativeInteger => "negativeInteger",
            IntegerType::Long => "long",
            IntegerType::Int => "int",
            IntegerType::Short => "short",
            IntegerType::Byte => "byte",
            IntegerType::NonNegativeInteger => "nonNegativeInteger",
            IntegerType::UnsignedLong => "unsignedLong",
            IntegerType::UnsignedInt => "unsignedInt",
            IntegerType::UnsignedShort => "unsignedShort",
            IntegerType::UnsignedByte => "unsignedByte",
            IntegerType::PositiveInteger => "positiveInteger",
        }
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.local_name() == name)
    }

    /// Inclusive value range of the facet. `None` means unbounded on that side.
    pub fn bounds(self) -> (Option<i128>, Option<i128>) {
        match self {
            IntegerType::Integer => (None, None),
            IntegerType::NonPositiveInteger => (None, Some(0)),
            IntegerType::NegativeInteger => (None, Some(-1)),
            IntegerType::Long => (Some(i64::MIN.into()), Some(i64::MAX.into())),
            IntegerType::Int => (Some(i32::MIN.into()), Some(i32::MAX.into())),
            IntegerType::Short => (Some(i16::MIN.into()), Some(i16::MAX.into())),
            IntegerType::Byte => (Some(i8::MIN.into()), Some(i8::MAX.into())),
            IntegerType::NonNegativeInteger => (Some(0), None),
            IntegerType::UnsignedLong => (Some(0), Some(u64::MAX.into())),
            IntegerType::UnsignedInt => (Some(0), Some(u32::MAX.into())),
            IntegerType::UnsignedShort => (Some(0), Some(u16::MAX.into())),
            IntegerType::UnsignedByte => (Some(0), Some(u8::MAX.into())),
            IntegerType::PositiveInteger => (Some(1), None),
        }
    }

    /// Range check performed once at construction (`FORG0001` on violation).
    pub fn check(self, value: i128) -> Result<i128, Error> {
        let (min, max) = self.bounds();
        if min.is_some_and(|m| value < m) || max.is_some_and(|m| value > m) {
            return Err(Error::from_code(
                ErrorCode::FORG0001,
                format!("value {value} out of range for xs:{}", self.local_name()),
            ));
        }
        Ok(value)
    }
}

/// String facets layered on `xs:string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringType {
    String,
    NormalizedString,
    Token,
    Language,
    NmToken,
    Name,
    NcName,
    Id,
    IdRef,
    Entity,
}

impl StringType {
    pub const ALL: [StringType; 10] = [
        StringType::String,
        StringType::NormalizedString,
        StringType::Token,
        StringType::Language,
        StringType::NmToken,
        StringType::Name,
        StringType::NcName,
        StringType::Id,
        StringType::IdRef,
        StringType::Entity,
    ];

    pub fn local_name(self) -> &'static str {
        match self {
            StringType::String => "string",
            StringType::NormalizedString => "normalizedString",
            StringType::Token => "token",
            StringType::Language => "language",
            StringType::NmToken => "NMTOKEN",
            StringType::Name => "Name",
            StringType::NcName => "NCName",
            StringType::Id => "ID",
            StringType::IdRef => "IDREF",
            StringType::Entity => "ENTITY",
        }
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.local_name() == name)
    }

    /// Apply the facet's whitespace rule and validate the lexical space.
    pub fn normalize(self, raw: &str) -> Result<String, Error> {
        let value = match self {
            StringType::String => return Ok(raw.to_string()),
            StringType::NormalizedString => replace_whitespace(raw),
            _ => collapse_whitespace(raw),
        };
        let ok = match self {
            StringType::String | StringType::NormalizedString | StringType::Token => true,
            StringType::Language => is_valid_language(&value),
            StringType::NmToken => !value.is_empty() && value.chars().all(is_name_char),
            StringType::Name => is_valid_name(&value),
            StringType::NcName | StringType::Id | StringType::IdRef | StringType::Entity => {
                is_valid_name(&value) && !value.contains(':')
            }
        };
        if ok {
            Ok(value)
        } else {
            Err(Error::from_code(
                ErrorCode::FORG0001,
                format!("invalid lexical form for xs:{}", self.local_name()),
            ))
        }
    }
}

/// Primitive kind of an atomic value. Facets never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicType {
    Boolean,
    String,
    UntypedAtomic,
    AnyUri,
    QName,
    Integer,
    Decimal,
    Float,
    Double,
    YearMonthDuration,
    DayTimeDuration,
    Duration,
    DateTime,
    Date,
    Time,
    HexBinary,
    Base64Binary,
}

impl AtomicType {
    pub fn local_name(self) -> &'static str {
        match self {
            AtomicType::Boolean => "boolean",
            AtomicType::String => "string",
            AtomicType::UntypedAtomic => "untypedAtomic",
            AtomicType::AnyUri => "anyURI",
            AtomicType::QName => "QName",
            AtomicType::Integer => "integer",
            AtomicType::Decimal => "decimal",
            AtomicType::Float => "float",
            AtomicType::Double => "double",
            AtomicType::YearMonthDuration => "yearMonthDuration",
            AtomicType::DayTimeDuration => "dayTimeDuration",
            AtomicType::Duration => "duration",
            AtomicType::DateTime => "dateTime",
            AtomicType::Date => "date",
            AtomicType::Time => "time",
            AtomicType::HexBinary => "hexBinary",
            AtomicType::Base64Binary => "base64Binary",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            AtomicType::Integer | AtomicType::Decimal | AtomicType::Float | AtomicType::Double
        )
    }

    pub fn is_duration(self) -> bool {
        matches!(
            self,
            AtomicType::YearMonthDuration | AtomicType::DayTimeDuration | AtomicType::Duration
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XdmAtomicValue {
    Boolean(bool),
    String { value: String, ty: StringType },
    UntypedAtomic(String),
    AnyUri(String),
    QName {
        ns_uri: Option<String>,
        prefix: Option<String>,
        local: String,
    },
    Integer { value: i128, ty: IntegerType },
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    /// Signed month count.
    YearMonthDuration(i64),
    DayTimeDuration(TimeDelta),
    /// `xs:duration` proper: both components, not homogeneous with either
    /// specialisation for arithmetic.
    Duration { months: i64, time: TimeDelta },
    DateTime {
        value: NaiveDateTime,
        tz: Option<FixedOffset>,
    },
    Date {
        date: NaiveDate,
        tz: Option<FixedOffset>,
    },
    Time {
        time: NaiveTime,
        tz: Option<FixedOffset>,
    },
    /// Decoded octets.
    HexBinary(Vec<u8>),
    /// Decoded octets.
    Base64Binary(Vec<u8>),
}

impl XdmAtomicValue {
    pub fn integer(value: impl Into<i128>) -> Self {
        XdmAtomicValue::Integer {
            value: value.into(),
            ty: IntegerType::Integer,
        }
    }

    /// Integer carrying a derived facet tag; validates the facet range.
    pub fn derived_integer(value: impl Into<i128>, ty: IntegerType) -> Result<Self, Error> {
        let value = ty.check(value.into())?;
        Ok(XdmAtomicValue::Integer { value, ty })
    }

    pub fn string(value: impl Into<String>) -> Self {
        XdmAtomicValue::String {
            value: value.into(),
            ty: StringType::String,
        }
    }

    /// String carrying a derived facet tag; normalizes whitespace and validates.
    pub fn derived_string(value: &str, ty: StringType) -> Result<Self, Error> {
        Ok(XdmAtomicValue::String {
            value: ty.normalize(value)?,
            ty,
        })
    }

    pub fn untyped(value: impl Into<String>) -> Self {
        XdmAtomicValue::UntypedAtomic(value.into())
    }

    pub fn qname(ns_uri: Option<&str>, local: impl Into<String>) -> Self {
        XdmAtomicValue::QName {
            ns_uri: ns_uri.map(str::to_string),
            prefix: None,
            local: local.into(),
        }
    }

    pub fn atomic_type(&self) -> AtomicType {
        match self {
            XdmAtomicValue::Boolean(_) => AtomicType::Boolean,
            XdmAtomicValue::String { .. } => AtomicType::String,
            XdmAtomicValue::UntypedAtomic(_) => AtomicType::UntypedAtomic,
            XdmAtomicValue::AnyUri(_) => AtomicType::AnyUri,
            XdmAtomicValue::QName { .. } => AtomicType::QName,
            XdmAtomicValue::Integer { .. } => AtomicType::Integer,
            XdmAtomicValue::Decimal(_) => AtomicType::Decimal,
            XdmAtomicValue::Float(_) => AtomicType::Float,
            XdmAtomicValue::Double(_) => AtomicType::Double,
            XdmAtomicValue::YearMonthDuration(_) => AtomicType::YearMonthDuration,
            XdmAtomicValue::DayTimeDuration(_) => AtomicType::DayTimeDuration,
            XdmAtomicValue::Duration { .. } => AtomicType::Duration,
            XdmAtomicValue::DateTime { .. } => AtomicType::DateTime,
            XdmAtomicValue::Date { .. } => AtomicType::Date,
            XdmAtomicValue::Time { .. } => AtomicType::Time,
            XdmAtomicValue::HexBinary(_) => AtomicType::HexBinary,
            XdmAtomicValue::Base64Binary(_) => AtomicType::Base64Binary,
        }
    }

    /// Reported type name including the facet tag, e.g. `xs:unsignedShort`.
    pub fn type_name(&self) -> String {
        let local = match self {
            XdmAtomicValue::Integer { ty, .. } => ty.local_name(),
            XdmAtomicValue::String { ty, .. } => ty.local_name(),
            other => other.atomic_type().local_name(),
        };
        format!("xs:{local}")
    }

    pub fn is_numeric(&self) -> bool {
        self.atomic_type().is_numeric()
    }

    pub fn is_nan(&self) -> bool {
        match self {
            XdmAtomicValue::Float(f) => f.is_nan(),
            XdmAtomicValue::Double(d) => d.is_nan(),
            _ => false,
        }
    }

    /// Text payload of the string-like kinds (`xs:string` and facets,
    /// `xs:untypedAtomic`, `xs:anyURI`).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            XdmAtomicValue::String { value, .. }
            | XdmAtomicValue::UntypedAtomic(value)
            | XdmAtomicValue::AnyUri(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            XdmAtomicValue::Integer { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Collapse the facet tag: integer facets become plain `xs:integer`,
    /// string facets plain `xs:string`. Other kinds are returned unchanged.
    #[must_use]
    pub fn into_primitive(self) -> Self {
        match self {
            XdmAtomicValue::Integer { value, .. } => XdmAtomicValue::integer(value),
            XdmAtomicValue::String { value, .. } => XdmAtomicValue::string(value),
            other => other,
        }
    }
}

impl From<bool> for XdmAtomicValue {
    fn from(b: bool) -> Self {
        XdmAtomicValue::Boolean(b)
    }
}

impl From<i64> for XdmAtomicValue {
    fn from(i: i64) -> Self {
        XdmAtomicValue::integer(i)
    }
}

impl From<f64> for XdmAtomicValue {
    fn from(d: f64) -> Self {
        XdmAtomicValue::Double(d)
    }
}

impl From<&str> for XdmAtomicValue {
    fn from(s: &str) -> Self {
        XdmAtomicValue::string(s)
    }
}

impl From<Decimal> for XdmAtomicValue {
    fn from(d: Decimal) -> Self {
        XdmAtomicValue::Decimal(d)
    }
}

/// Canonical lexical form (the value's `xs:string` cast).
impl fmt::Display for XdmAtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use super::{duration, temporal};
        match self {
            XdmAtomicValue::Boolean(b) => write!(f, "{b}"),
            XdmAtomicValue::String { value, .. }
            | XdmAtomicValue::UntypedAtomic(value)
            | XdmAtomicValue::AnyUri(value) => f.write_str(value),
            XdmAtomicValue::QName { prefix, local, .. } => match prefix {
                Some(p) if !p.is_empty() => write!(f, "{p}:{local}"),
                _ => f.write_str(local),
            },
            XdmAtomicValue::Integer { value, .. } => write!(f, "{value}"),
            XdmAtomicValue::Decimal(d) => write!(f, "{}", d.normalize()),
            XdmAtomicValue::Float(v) => f.write_str(&format_float(*v)),
            XdmAtomicValue::Double(v) => f.write_str(&format_double(*v)),
            XdmAtomicValue::YearMonthDuration(months) => {
                f.write_str(&duration::format_year_month(*months))
            }
            XdmAtomicValue::DayTimeDuration(d) => f.write_str(&duration::format_day_time(*d)),
            XdmAtomicValue::Duration { months, time } => {
                f.write_str(&duration::format_duration(*months, *time))
            }
            XdmAtomicValue::DateTime { value, tz } => {
                f.write_str(&temporal::format_date_time(value, *tz))
            }
            XdmAtomicValue::Date { date, tz } => f.write_str(&temporal::format_date(date, *tz)),
            XdmAtomicValue::Time { time, tz } => f.write_str(&temporal::format_time(time, *tz)),
            XdmAtomicValue::HexBinary(bytes) => {
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
            XdmAtomicValue::Base64Binary(bytes) => {
                use base64::Engine as _;
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        }
    }
}

/// XPath canonical double: plain notation in `[1e-6, 1e6)`, scientific otherwise.
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let abs = v.abs();
    if (1e-6..1e6).contains(&abs) {
        format!("{v}")
    } else {
        scientific(&format!("{v:e}"))
    }
}

pub fn format_float(v: f32) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let abs = v.abs();
    if (1e-6..1e6).contains(&abs) {
        format!("{v}")
    } else {
        scientific(&format!("{v:e}"))
    }
}

// Rust renders `1e10` / `1.5e-7`; the XPath form needs a fractional digit and `E`.
fn scientific(rust_exp: &str) -> String {
    let (mantissa, exp) = rust_exp.split_once('e').unwrap_or((rust_exp, "0"));
    if mantissa.contains('.') {
        format!("{mantissa}E{exp}")
    } else {
        format!("{mantissa}.0E{exp}")
    }
}

pub(crate) fn replace_whitespace(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split([' ', '\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_numeric() || matches!(c, '-' | '.' | '\u{B7}')
}

fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_valid_language(s: &str) -> bool {
    let mut parts = s.split('-');
    let Some(primary) = parts.next() else {
        return false;
    };
    if primary.is_empty() || primary.len() > 8 || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    parts.all(|p| !p.is_empty() && p.len() <= 8 && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_facet_bounds() {
        assert!(XdmAtomicValue::derived_integer(255, IntegerType::UnsignedByte).is_ok());
        let err = XdmAtomicValue::derived_integer(256, IntegerType::UnsignedByte).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::FORG0001);
        assert!(XdmAtomicValue::derived_integer(0, IntegerType::PositiveInteger).is_err());
        assert!(XdmAtomicValue::derived_integer(u64::MAX, IntegerType::UnsignedLong).is_ok());
    }

    #[test]
    fn facet_does_not_change_primitive_kind() {
        let v = XdmAtomicValue::derived_integer(7, IntegerType::Short).unwrap();
        assert_eq!(v.atomic_type(), AtomicType::Integer);
        assert_eq!(v.type_name(), "xs:short");
        assert_eq!(v.into_primitive().type_name(), "xs:integer");
    }

    #[test]
    fn string_facets_normalize() {
        let t = XdmAtomicValue::derived_string("  a \n b ", StringType::Token).unwrap();
        assert_eq!(t.as_str(), Some("a b"));
        assert!(XdmAtomicValue::derived_string("a:b", StringType::NcName).is_err());
        assert!(XdmAtomicValue::derived_string("en-US", StringType::Language).is_ok());
        assert!(XdmAtomicValue::derived_string("toolonglanguage", StringType::Language).is_err());
    }

    #[test]
    fn double_canonical_form() {
        assert_eq!(format_double(1.5), "1.5");
        assert_eq!(format_double(100.0), "100");
        assert_eq!(format_double(1e10), "1.0E10");
        assert_eq!(format_double(-1.7976931348623157e308), "-1.7976931348623157E308");
        assert_eq!(format_double(-0.0), "-0");
        assert_eq!(format_double(f64::NAN), "NaN");
        assert_eq!(format_float(f32::NEG_INFINITY), "-INF");
    }
}
