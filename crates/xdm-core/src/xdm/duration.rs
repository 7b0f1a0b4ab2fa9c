//! Lexical forms of `xs:duration`, `xs:yearMonthDuration` and `xs:dayTimeDuration`.
//!
//! Year-month parts are held as a signed month count, day-time parts as a
//! `chrono::TimeDelta` with nanosecond precision (extra fractional digits are
//! truncated).

use chrono::TimeDelta;

use crate::engine::runtime::{Error, ErrorCode};

const NANOS_PER_SEC: i64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationParts {
    pub months: i64,
    pub time: TimeDelta,
    pub has_year_month: bool,
    pub has_day_time: bool,
}

fn invalid(ty: &str, s: &str) -> Error {
    Error::from_code(ErrorCode::FORG0001, format!("invalid xs:{ty} lexical form '{s}'"))
}

/// Split a digit run off the front of `cur`.
fn take_digits(cur: &str) -> (&str, &str) {
    let end = cur.find(|c: char| !c.is_ascii_digit()).unwrap_or(cur.len());
    cur.split_at(end)
}

/// Parse the `-?PnYnMnDTnHnMn.nS` grammar shared by all duration types.
pub fn parse_duration_parts(s: &str) -> Option<DurationParts> {
    let s = s.trim();
    let (neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let mut cur = body.strip_prefix('P')?;
    let (date_part, time_part) = match cur.split_once('T') {
        Some((d, t)) => {
            if t.is_empty() {
                return None;
            }
            (d, Some(t))
        }
        None => (cur, None),
    };

    let mut parts = DurationParts::default();
    let mut years: i64 = 0;
    let mut months: i64 = 0;
    let mut days: i64 = 0;
    // Designators must appear in order; `rank` tracks the last one seen.
    let mut rank = 0u8;
    cur = date_part;
    while !cur.is_empty() {
        let (digits, rest) = take_digits(cur);
        if digits.is_empty() {
            return None;
        }
        let n: i64 = digits.parse().ok()?;
        let mut chars = rest.chars();
        let designator = chars.next()?;
        let next_rank = match designator {
            'Y' => 1,
            'M' => 2,
            'D' => 3,
            _ => return None,
        };
        if next_rank <= rank {
            return None;
        }
        rank = next_rank;
        match designator {
            'Y' => years = n,
            'M' => months = n,
            _ => days = n,
        }
        if designator == 'D' {
            parts.has_day_time = true;
        } else {
            parts.has_year_month = true;
        }
        cur = chars.as_str();
    }

    let mut hours: i64 = 0;
    let mut minutes: i64 = 0;
    let mut secs: i64 = 0;
    let mut nanos: i64 = 0;
    if let Some(t) = time_part {
        rank = 0;
        cur = t;
        while !cur.is_empty() {
            let (digits, rest) = take_digits(cur);
            if digits.is_empty() {
                return None;
            }
            let (fraction, rest) = match rest.strip_prefix('.') {
                Some(after_dot) => {
                    let (frac, rest) = take_digits(after_dot);
                    if frac.is_empty() {
                        return None;
                    }
                    (Some(frac), rest)
                }
                None => (None, rest),
            };
            let mut chars = rest.chars();
            let designator = chars.next()?;
            let next_rank = match designator {
                'H' => 1,
                'M' => 2,
                'S' => 3,
                _ => return None,
            };
            if next_rank <= rank || (fraction.is_some() && designator != 'S') {
                return None;
            }
            rank = next_rank;
            let n: i64 = digits.parse().ok()?;
            match designator {
                'H' => hours = n,
                'M' => minutes = n,
                _ => {
                    secs = n;
                    if let Some(frac) = fraction {
                        let mut padded: String = frac.chars().take(9).collect();
                        while padded.len() < 9 {
                            padded.push('0');
                        }
                        nanos = padded.parse().ok()?;
                    }
                }
            }
            parts.has_day_time = true;
            cur = chars.as_str();
        }
    }

    if !parts.has_year_month && !parts.has_day_time {
        return None;
    }

    let total_months = years.checked_mul(12)?.checked_add(months)?;
    let total_secs = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(secs)?;
    let mut time = TimeDelta::try_seconds(total_secs)?.checked_add(&TimeDelta::nanoseconds(nanos))?;
    parts.months = total_months;
    if neg {
        parts.months = -parts.months;
        time = -time;
    }
    parts.time = time;
    Some(parts)
}

pub fn parse_year_month_duration(s: &str) -> Result<i64, Error> {
    match parse_duration_parts(s) {
        Some(p) if !p.has_day_time => Ok(p.months),
        _ => Err(invalid("yearMonthDuration", s)),
    }
}

pub fn parse_day_time_duration(s: &str) -> Result<TimeDelta, Error> {
    match parse_duration_parts(s) {
        Some(p) if !p.has_year_month => Ok(p.time),
        _ => Err(invalid("dayTimeDuration", s)),
    }
}

pub fn parse_duration(s: &str) -> Result<(i64, TimeDelta), Error> {
    parse_duration_parts(s)
        .map(|p| (p.months, p.time))
        .ok_or_else(|| invalid("duration", s))
}

fn push_year_month(out: &mut String, months: u64) {
    let y = months / 12;
    let m = months % 12;
    if y != 0 {
        out.push_str(&format!("{y}Y"));
    }
    if m != 0 {
        out.push_str(&format!("{m}M"));
    }
}

fn push_day_time(out: &mut String, abs_nanos: i128) {
    let nanos_per_sec = i128::from(NANOS_PER_SEC);
    let total_secs = abs_nanos / nanos_per_sec;
    let frac = abs_nanos % nanos_per_sec;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let secs = total_secs % 60;
    if days != 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours != 0 || minutes != 0 || secs != 0 || frac != 0 {
        out.push('T');
    }
    if hours != 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes != 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if frac != 0 {
        let digits = format!("{frac:09}");
        out.push_str(&format!("{secs}.{}S", digits.trim_end_matches('0')));
    } else if secs != 0 {
        out.push_str(&format!("{secs}S"));
    }
}

fn delta_nanos(d: TimeDelta) -> i128 {
    i128::from(d.num_seconds()) * i128::from(NANOS_PER_SEC) + i128::from(d.subsec_nanos())
}

pub fn format_year_month(months: i64) -> String {
    if months == 0 {
        return "P0M".to_string();
    }
    let mut out = String::new();
    if months < 0 {
        out.push('-');
    }
    out.push('P');
    push_year_month(&mut out, months.unsigned_abs());
    out
}

pub fn format_day_time(d: TimeDelta) -> String {
    let nanos = delta_nanos(d);
    if nanos == 0 {
        return "PT0S".to_string();
    }
    let mut out = String::new();
    if nanos < 0 {
        out.push('-');
    }
    out.push('P');
    push_day_time(&mut out, nanos.abs());
    out
}

pub fn format_duration(months: i64, time: TimeDelta) -> String {
    let nanos = delta_nanos(time);
    if months == 0 && nanos == 0 {
        return "PT0S".to_string();
    }
    let mut out = String::new();
    if months < 0 || nanos < 0 {
        out.push('-');
    }
    out.push('P');
    push_year_month(&mut out, months.unsigned_abs());
    push_day_time(&mut out, nanos.abs());
    out
}

/// Total nanoseconds of a day-time duration, used for hashing and ordering.
pub fn total_nanos(d: TimeDelta) -> i128 {
    delta_nanos(d)
}
