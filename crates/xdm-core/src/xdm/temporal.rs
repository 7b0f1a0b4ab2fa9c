//! `xs:date`, `xs:time` and `xs:dateTime` lexical forms and timezone handling.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::engine::runtime::{Error, ErrorCode};

fn invalid(ty: &str, s: &str) -> Error {
    Error::from_code(ErrorCode::FORG0001, format!("invalid xs:{ty} lexical form '{s}'"))
}

/// Split a trailing timezone (`Z`, `+hh:mm`, `-hh:mm`) off a lexical value.
/// `min_body` keeps the date's own `-` separators from being taken for an offset.
fn split_timezone(s: &str, min_body: usize) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(body) = s.strip_suffix('Z') {
        return Some((body, FixedOffset::east_opt(0)));
    }
    if s.len() >= min_body + 6 && s.is_char_boundary(s.len() - 6) {
        let (body, tz) = s.split_at(s.len() - 6);
        if tz.starts_with(['+', '-']) && tz.as_bytes()[3] == b':' {
            return Some((body, Some(parse_offset(tz)?)));
        }
    }
    Some((s, None))
}

/// `±hh:mm`, hours up to 14.
pub fn parse_offset(tz: &str) -> Option<FixedOffset> {
    if tz == "Z" {
        return FixedOffset::east_opt(0);
    }
    if tz.len() != 6 || !tz.is_char_boundary(1) {
        return None;
    }
    let sign = match &tz[0..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = tz.get(1..3)?.parse().ok()?;
    let mins: i32 = tz.get(4..6)?.parse().ok()?;
    if hours > 14 || mins > 59 || (hours == 14 && mins != 0) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + mins * 60))
}

pub fn format_offset(off: FixedOffset) -> String {
    let secs = off.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

fn parse_date_body(s: &str) -> Option<NaiveDate> {
    let (neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let mut it = body.splitn(3, '-');
    let year = it.next()?;
    let month = it.next()?;
    let day = it.next()?;
    if year.len() < 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }
    if !(year.bytes().all(|b| b.is_ascii_digit())
        && month.bytes().all(|b| b.is_ascii_digit())
        && day.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let mut y: i32 = year.parse().ok()?;
    if neg {
        y = -y;
    }
    NaiveDate::from_ymd_opt(y, month.parse().ok()?, day.parse().ok()?)
}

/// Returns the time and whether it was written as `24:00:00`.
fn parse_time_body(s: &str) -> Option<(NaiveTime, bool)> {
    let bytes = s.as_bytes();
    if s.len() < 8 || bytes[2] != b':' || bytes[5] != b':' {
        return None;
    }
    let h: u32 = s.get(0..2)?.parse().ok()?;
    let m: u32 = s.get(3..5)?.parse().ok()?;
    let sec_part = s.get(6..)?;
    let (whole, frac) = match sec_part.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (sec_part, None),
    };
    if whole.len() != 2 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sec: u32 = whole.parse().ok()?;
    let nanos: u32 = match frac {
        Some(f) if !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()) => {
            let mut padded: String = f.chars().take(9).collect();
            while padded.len() < 9 {
                padded.push('0');
            }
            padded.parse().ok()?
        }
        Some(_) => return None,
        None => 0,
    };
    if h == 24 {
        return (m == 0 && sec == 0 && nanos == 0).then_some((NaiveTime::MIN, true));
    }
    NaiveTime::from_hms_nano_opt(h, m, sec, nanos).map(|t| (t, false))
}

pub fn parse_date(s: &str) -> Result<(NaiveDate, Option<FixedOffset>), Error> {
    let t = s.trim();
    let (body, tz) = split_timezone(t, 10).ok_or_else(|| invalid("date", s))?;
    let date = parse_date_body(body).ok_or_else(|| invalid("date", s))?;
    Ok((date, tz))
}

pub fn parse_time(s: &str) -> Result<(NaiveTime, Option<FixedOffset>), Error> {
    let t = s.trim();
    let (body, tz) = split_timezone(t, 8).ok_or_else(|| invalid("time", s))?;
    let (time, _) = parse_time_body(body).ok_or_else(|| invalid("time", s))?;
    Ok((time, tz))
}

pub fn parse_date_time(s: &str) -> Result<(NaiveDateTime, Option<FixedOffset>), Error> {
    let t = s.trim();
    let (body, tz) = split_timezone(t, 19).ok_or_else(|| invalid("dateTime", s))?;
    let (date_s, time_s) = body.split_once('T').ok_or_else(|| invalid("dateTime", s))?;
    let date = parse_date_body(date_s).ok_or_else(|| invalid("dateTime", s))?;
    let (time, end_of_day) = parse_time_body(time_s).ok_or_else(|| invalid("dateTime", s))?;
    let mut value = date.and_time(time);
    if end_of_day {
        value = value
            .checked_add_signed(TimeDelta::days(1))
            .ok_or_else(|| invalid("dateTime", s))?;
    }
    Ok((value, tz))
}

fn format_time_body(time: &NaiveTime) -> String {
    let base = time.format("%H:%M:%S").to_string();
    let nanos = time.nanosecond();
    if nanos == 0 {
        base
    } else {
        let digits = format!("{nanos:09}");
        format!("{base}.{}", digits.trim_end_matches('0'))
    }
}

fn push_tz(out: &mut String, tz: Option<FixedOffset>) {
    if let Some(off) = tz {
        out.push_str(&format_offset(off));
    }
}

pub fn format_date(date: &NaiveDate, tz: Option<FixedOffset>) -> String {
    let mut out = date.format("%Y-%m-%d").to_string();
    push_tz(&mut out, tz);
    out
}

pub fn format_time(time: &NaiveTime, tz: Option<FixedOffset>) -> String {
    let mut out = format_time_body(time);
    push_tz(&mut out, tz);
    out
}

pub fn format_date_time(value: &NaiveDateTime, tz: Option<FixedOffset>) -> String {
    let mut out = format!(
        "{}T{}",
        value.date().format("%Y-%m-%d"),
        format_time_body(&value.time())
    );
    push_tz(&mut out, tz);
    out
}

/// Map a local date-time to its UTC instant, filling a missing timezone with
/// the implicit one.
pub fn to_utc(local: NaiveDateTime, tz: Option<FixedOffset>, implicit: FixedOffset) -> NaiveDateTime {
    let off = tz.unwrap_or(implicit);
    local - TimeDelta::seconds(i64::from(off.local_minus_utc()))
}

/// `xs:time` values compare on a fixed reference date.
pub fn time_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1972, 12, 31).unwrap_or(NaiveDate::MIN)
}
