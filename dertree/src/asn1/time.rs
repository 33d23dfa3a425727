//! ASN.1 `UTCTime` and `GeneralizedTime` values.
//!
//! Both types are stored and emitted as the character strings that
//! appear on the wire; this module parses those strings into calendar
//! instants on demand (proleptic Gregorian, normalised to UTC) and
//! produces the canonical string forms for instants supplied by a
//! caller.

use crate::{Error, ErrorKind, Result, Tag};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};

fn value_error(tag: Tag) -> Error {
    ErrorKind::Value { tag }.into()
}

/// Parse a `UTCTime` string: `YYMMDDHHMM[SS]` with an optional `Z` or
/// `+-HHMM` suffix. Two-digit years below 50 land in 2000..2049, the
/// rest in 1950..1999.
pub fn parse_utc_time(s: &str) -> Result<DateTime<Utc>> {
    let tag = Tag::UTC_TIME;
    let b = s.as_bytes();

    if b.len() < 10 {
        return Err(value_error(tag));
    }

    let yy = pair(b, 0, tag)?;
    let month = pair(b, 2, tag)?;
    let day = pair(b, 4, tag)?;
    let hour = pair(b, 6, tag)?;
    let minute = pair(b, 8, tag)?;

    let mut i = 10;
    let second = if i + 1 < b.len() && b[i].is_ascii_digit() {
        i += 2;
        pair(b, i - 2, tag)?
    } else {
        0
    };

    let offset = parse_offset(&b[i..], true, tag)?;
    let century = if yy < 50 { 2000 } else { 1900 };

    to_instant(century + i32::from(yy), month, day, hour, minute, second, 0, offset, tag)
}

/// Parse a `GeneralizedTime` string: `YYYYMMDDHHMMSS` with an optional
/// fractional-second part (up to seven digits consumed, the rest
/// ignored) and an optional `Z` or `+-HH[MM]` suffix.
pub fn parse_generalized_time(s: &str) -> Result<DateTime<Utc>> {
    let tag = Tag::GENERALIZED_TIME;
    let b = s.as_bytes();

    if b.len() < 10 {
        return Err(value_error(tag));
    }

    let year = i32::from(pair(b, 0, tag)?) * 100 + i32::from(pair(b, 2, tag)?);
    let month = pair(b, 4, tag)?;
    let day = pair(b, 6, tag)?;
    let hour = pair(b, 8, tag)?;

    let mut i = 10;
    let minute = if i + 1 < b.len() && b[i].is_ascii_digit() {
        i += 2;
        pair(b, i - 2, tag)?
    } else {
        0
    };
    let second = if i + 1 < b.len() && b[i].is_ascii_digit() {
        i += 2;
        pair(b, i - 2, tag)?
    } else {
        0
    };

    let mut nano = 0u32;
    if i < b.len() && (b[i] == b'.' || b[i] == b',') {
        i += 1;
        let start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return Err(value_error(tag));
        }

        // Seven digits give 100ns resolution; anything finer is ignored.
        let kept = (i - start).min(7);
        let mut frac = 0u32;
        for &d in &b[start..start + kept] {
            frac = frac * 10 + u32::from(d - b'0');
        }
        nano = frac * 10u32.pow(9 - kept as u32);
    }

    let offset = parse_offset(&b[i..], false, tag)?;

    to_instant(year, month, day, hour, minute, second, nano, offset, tag)
}

/// Canonical `UTCTime` string for an instant: `YYMMDDHHMMSSZ`.
pub fn utc_time_string(dt: &DateTime<Utc>) -> Result<String> {
    let year = dt.year();
    if !(1950..=2049).contains(&year) {
        return Err(value_error(Tag::UTC_TIME));
    }

    Ok(format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}Z",
        year % 100,
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    ))
}

/// Canonical `GeneralizedTime` string for an instant:
/// `YYYYMMDDHHMMSS[.f…]Z` with trailing fraction zeros dropped.
pub fn generalized_time_string(dt: &DateTime<Utc>) -> Result<String> {
    let year = dt.year();
    if !(1..=9999).contains(&year) {
        return Err(value_error(Tag::GENERALIZED_TIME));
    }

    let mut out = format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        year,
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    );

    let frac = dt.nanosecond() / 100;
    if frac != 0 {
        let digits = format!("{:07}", frac);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }

    out.push('Z');
    Ok(out)
}

/// Human-readable UTC form used in pretty-printer comments:
/// `YYYY-MM-DD HH:MM:SS[.fffffff] UTC`.
pub fn format_instant(dt: &DateTime<Utc>) -> String {
    let mut out = format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    );

    let frac = dt.nanosecond() / 100;
    if frac != 0 {
        out.push_str(&format!(".{:07}", frac));
    }

    out.push_str(" UTC");
    out
}

fn pair(b: &[u8], i: usize, tag: Tag) -> Result<u8> {
    match (b.get(i), b.get(i + 1)) {
        (Some(hi), Some(lo)) if hi.is_ascii_digit() && lo.is_ascii_digit() => {
            Ok((hi - b'0') * 10 + (lo - b'0'))
        }
        _ => Err(value_error(tag)),
    }
}

/// Parse the timezone suffix, returning the offset from UTC in minutes.
/// An empty suffix means UTC. `minutes_required` distinguishes the
/// `UTCTime` form (`+-HHMM`) from `GeneralizedTime` (`+-HH[MM]`).
fn parse_offset(rest: &[u8], minutes_required: bool, tag: Tag) -> Result<i32> {
    match rest {
        [] | [b'Z'] => Ok(0),
        [sign @ (b'+' | b'-'), digits @ ..] => {
            let hours = pair(digits, 0, tag)?;
            let minutes = match digits.len() {
                2 if !minutes_required => 0,
                4 => pair(digits, 2, tag)?,
                _ => return Err(value_error(tag)),
            };

            if hours > 23 || minutes > 59 {
                return Err(value_error(tag));
            }

            let total = i32::from(hours) * 60 + i32::from(minutes);
            Ok(if *sign == b'-' { -total } else { total })
        }
        _ => Err(value_error(tag)),
    }
}

#[allow(clippy::too_many_arguments)]
fn to_instant(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    nano: u32,
    offset_minutes: i32,
    tag: Tag,
) -> Result<DateTime<Utc>> {
    if !(1..=9999).contains(&year) {
        return Err(value_error(tag));
    }

    // A positive leap second is not representable; fold it into :59.
    let second = if second == 60 { 59 } else { second };

    let naive = NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        .and_then(|d| {
            d.and_hms_nano_opt(u32::from(hour), u32::from(minute), u32::from(second), nano)
        })
        .ok_or_else(|| value_error(tag))?;

    let utc = naive - Duration::minutes(i64::from(offset_minutes));
    Ok(Utc.from_utc_datetime(&utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_time_basic() {
        let dt = parse_utc_time("910506234540Z").unwrap();
        assert_eq!(dt.timestamp(), 673573540);
        assert_eq!(format_instant(&dt), "1991-05-06 23:45:40 UTC");
        assert_eq!(utc_time_string(&dt).unwrap(), "910506234540Z");
    }

    #[test]
    fn utc_time_century_pivot() {
        assert_eq!(parse_utc_time("490101000000Z").unwrap().year(), 2049);
        assert_eq!(parse_utc_time("500101000000Z").unwrap().year(), 1950);
    }

    #[test]
    fn utc_time_without_seconds() {
        let dt = parse_utc_time("9105062345Z").unwrap();
        assert_eq!(dt.timestamp(), 673573500);
    }

    #[test]
    fn utc_time_offset() {
        // 23:45:40 at UTC-07:00 is 06:45:40 the next day in UTC.
        let dt = parse_utc_time("910506234540-0700").unwrap();
        assert_eq!(dt.timestamp(), 673573540 + 7 * 3600);
        assert_eq!(format_instant(&dt), "1991-05-07 06:45:40 UTC");
    }

    #[test]
    fn generalized_time_fraction() {
        let dt = parse_generalized_time("19910506234540.5Z").unwrap();
        assert_eq!(dt.timestamp(), 673573540);
        assert_eq!(dt.nanosecond(), 500_000_000);
        assert_eq!(format_instant(&dt), "1991-05-06 23:45:40.5000000 UTC");
        assert_eq!(
            generalized_time_string(&dt).unwrap(),
            "19910506234540.5Z"
        );
    }

    #[test]
    fn generalized_time_fraction_overflow_digits_ignored() {
        let dt = parse_generalized_time("19910506234540.123456789Z").unwrap();
        assert_eq!(dt.nanosecond(), 123_456_700);
    }

    #[test]
    fn leap_second_coerced() {
        let dt = parse_generalized_time("19910506234560Z").unwrap();
        assert_eq!(dt.second(), 59);
    }

    #[test]
    fn year_range_enforced() {
        assert!(parse_generalized_time("00000101000000Z").is_err());
        assert!(parse_utc_time("910506234540").is_ok());
        assert!(utc_time_string(&parse_generalized_time("20900101000000Z").unwrap()).is_err());
    }

    #[test]
    fn malformed_rejected() {
        assert!(parse_utc_time("9105062345 40Z").is_err());
        assert!(parse_utc_time("91050623454").is_err());
        assert!(parse_generalized_time("1991050623454").is_err());
        assert!(parse_generalized_time("19910506234540.Z").is_err());
        assert!(parse_generalized_time("19910506234540+25").is_err());
    }
}
