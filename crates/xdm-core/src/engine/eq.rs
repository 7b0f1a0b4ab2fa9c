//! Hashable equality keys for `fn:distinct-values`.
//!
//! Non-numeric values map to an [`EqKey`] whose equality coincides with
//! typed-value `eq` under the active collation. Numerics cannot be hashed
//! exactly across ranks, so they are bucketed by their `f32` image (equal
//! values after promotion always share it) and compared pairwise inside the
//! bucket. NaN forms a single bucket whose members are all equal.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDateTime, NaiveTime};
use smallvec::SmallVec;

use crate::engine::comparison::{Comparator, duration_parts};
use crate::engine::numeric::{NumKind, classify, compare_numeric};
use crate::xdm::{XdmAtomicValue, temporal};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EqKey {
    Boolean(bool),
    /// Collation key of `xs:string`, `xs:anyURI` and `xs:untypedAtomic`.
    Text(String),
    /// Any duration kind as `(months, nanoseconds)`.
    Duration(i64, i128),
    DateTime(NaiveDateTime),
    Date(NaiveDateTime),
    Time(NaiveDateTime),
    QName(Option<String>, String),
    HexBinary(Vec<u8>),
    Base64Binary(Vec<u8>),
}

/// Equality key of a non-numeric value (`None` for numerics).
pub fn build_eq_key(v: &XdmAtomicValue, cmp: &Comparator) -> Option<EqKey> {
    use XdmAtomicValue as V;
    let tz = cmp.implicit_timezone();
    Some(match v {
        V::Boolean(b) => EqKey::Boolean(*b),
        V::String { value, .. } | V::AnyUri(value) | V::UntypedAtomic(value) => {
            EqKey::Text(cmp.collation().key(value))
        }
        V::YearMonthDuration(_) | V::DayTimeDuration(_) | V::Duration { .. } => {
            let (months, nanos) = duration_parts(v)?;
            EqKey::Duration(months, nanos)
        }
        V::DateTime { value, tz: t } => EqKey::DateTime(temporal::to_utc(*value, *t, tz)),
        V::Date { date, tz: t } => EqKey::Date(temporal::to_utc(date.and_time(NaiveTime::MIN), *t, tz)),
        V::Time { time, tz: t } => {
            EqKey::Time(temporal::to_utc(temporal::time_reference_date().and_time(*time), *t, tz))
        }
        V::QName { ns_uri, local, .. } => EqKey::QName(ns_uri.clone(), local.clone()),
        V::HexBinary(b) => EqKey::HexBinary(b.clone()),
        V::Base64Binary(b) => EqKey::Base64Binary(b.clone()),
        V::Integer { .. } | V::Decimal(_) | V::Float(_) | V::Double(_) => return None,
    })
}

const NAN_BUCKET: u32 = 0x7fc0_0000;

fn numeric_bucket(n: NumKind) -> u32 {
    if n.is_nan() {
        return NAN_BUCKET;
    }
    let f = n.to_f32();
    // +0 and -0 share a bucket.
    if f == 0.0 { 0 } else { f.to_bits() }
}

/// Seen-set for deduplication. Inserting reports whether the value is new.
pub struct DistinctSet<'a> {
    cmp: &'a Comparator,
    keys: HashSet<EqKey>,
    numerics: HashMap<u32, SmallVec<[NumKind; 2]>>,
}

impl<'a> DistinctSet<'a> {
    pub fn new(cmp: &'a Comparator) -> Self {
        Self {
            cmp,
            keys: HashSet::new(),
            numerics: HashMap::new(),
        }
    }

    pub fn insert(&mut self, v: &XdmAtomicValue) -> bool {
        if let Some(n) = classify(v) {
            let bucket = self.numerics.entry(numeric_bucket(n)).or_default();
            let seen = bucket.iter().any(|m| {
                (m.is_nan() && n.is_nan()) || compare_numeric(*m, n).is_some_and(|o| o.is_eq())
            });
            if !seen {
                bucket.push(n);
            }
            return !seen;
        }
        match build_eq_key(v, self.cmp) {
            Some(key) => self.keys.insert(key),
            None => true,
        }
    }
}
