//! ISO 8601 text form of XMP dates
//!
//! Used by [`MemoryEngine`](crate::engine::MemoryEngine), which stores every
//! value as text and converts dates on the typed accessors.
//!
//! Accepted forms:
//! - `YYYY`, `YYYY-MM`, `YYYY-MM-DD`
//! - `YYYY-MM-DDThh:mm`, `YYYY-MM-DDThh:mm:ss`, `YYYY-MM-DDThh:mm:ss.sss`
//! - any of the timed forms followed by `Z`, `+hh:mm` or `-hh:mm`

use crate::engine::RawDateTime;

/// Parse the text form; `None` when it is malformed
pub fn parse_date_time(s: &str) -> Option<RawDateTime> {
    let mut dt = RawDateTime::default();
    let (date, time) = match s.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (s, None),
    };

    let (negative, date) = match date.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, date),
    };
    let mut parts = date.split('-');
    let year: i32 = number(parts.next()?, 4..=9)?;
    dt.year = if negative { -year } else { year };
    if let Some(month) = parts.next() {
        dt.month = bounded(month, 1, 12)?;
    }
    if let Some(day) = parts.next() {
        dt.day = bounded(day, 1, 31)?;
    }
    if parts.next().is_some() {
        return None;
    }

    let Some(time) = time else {
        return Some(dt);
    };
    if dt.day == 0 {
        return None;
    }

    // Split off the timezone designator
    let (clock, zone) = match time.find(|c: char| matches!(c, 'Z' | '+' | '-')) {
        Some(pos) => time.split_at(pos),
        None => (time, ""),
    };

    let mut fields = clock.split(':');
    dt.hour = bounded(fields.next()?, 0, 23)?;
    dt.minute = bounded(fields.next()?, 0, 59)?;
    if let Some(seconds) = fields.next() {
        let (whole, fraction) = match seconds.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (seconds, None),
        };
        dt.second = bounded(whole, 0, 60)?;
        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // Scale to nanoseconds, dropping digits past the ninth
            let digits: String = fraction
                .chars()
                .chain(std::iter::repeat('0'))
                .take(9)
                .collect();
            dt.nano_second = digits.parse().ok()?;
        }
    }
    if fields.next().is_some() {
        return None;
    }

    match zone {
        "" | "Z" => {}
        _ => {
            let (sign, offset) = zone.split_at(1);
            dt.tz_sign = if sign == "+" { 1 } else { -1 };
            let (hour, minute) = offset.split_once(':')?;
            dt.tz_hour = bounded(hour, 0, 23)?;
            dt.tz_minute = bounded(minute, 0, 59)?;
            if dt.tz_hour == 0 && dt.tz_minute == 0 {
                dt.tz_sign = 0;
            }
        }
    }
    Some(dt)
}

/// Format as text, the inverse of [`parse_date_time`]
///
/// Partial dates stay partial. A zero offset is written without a designator.
pub fn format_date_time(dt: &RawDateTime) -> String {
    let mut out = if dt.year < 0 {
        format!("-{:04}", -i64::from(dt.year))
    } else {
        format!("{:04}", dt.year)
    };
    if dt.month == 0 {
        return out;
    }
    out.push_str(&format!("-{:02}", dt.month));
    if dt.day == 0 {
        return out;
    }
    out.push_str(&format!(
        "-{:02}T{:02}:{:02}:{:02}",
        dt.day, dt.hour, dt.minute, dt.second
    ));
    if dt.nano_second > 0 {
        let fraction = format!("{:09}", dt.nano_second);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    if dt.tz_sign != 0 {
        out.push(if dt.tz_sign > 0 { '+' } else { '-' });
        out.push_str(&format!("{:02}:{:02}", dt.tz_hour, dt.tz_minute));
    }
    out
}

fn number(s: &str, width: std::ops::RangeInclusive<usize>) -> Option<i32> {
    if !width.contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn bounded(s: &str, min: i32, max: i32) -> Option<i32> {
    let value = number(s, 2..=2)?;
    (min..=max).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let dt = parse_date_time("2006-12-07T23:20:43-05:00").unwrap();
        assert_eq!(
            (dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second),
            (2006, 12, 7, 23, 20, 43)
        );
        assert_eq!((dt.tz_sign, dt.tz_hour, dt.tz_minute), (-1, 5, 0));
    }

    #[test]
    fn test_parse_partial_and_fraction() {
        let year = parse_date_time("2006").unwrap();
        assert_eq!((year.year, year.month, year.day), (2006, 0, 0));

        let fraction = parse_date_time("2010-01-02T03:04:05.25Z").unwrap();
        assert_eq!(fraction.nano_second, 250_000_000);
        assert_eq!(fraction.tz_sign, 0);

        let no_seconds = parse_date_time("2010-01-02T03:04+01:30").unwrap();
        assert_eq!((no_seconds.second, no_seconds.tz_minute), (0, 30));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "20", "2006-13", "2006-12-07T", "2006-12-07T25:00", "abc", "2006-1-1"] {
            assert!(parse_date_time(bad).is_none(), "{bad}");
        }
    }

    #[test]
    fn test_format() {
        let dt = RawDateTime {
            year: 2005,
            month: 12,
            day: 25,
            hour: 12,
            minute: 42,
            second: 42,
            ..RawDateTime::default()
        };
        assert_eq!(format_date_time(&dt), "2005-12-25T12:42:42");

        let west = RawDateTime {
            tz_sign: -1,
            tz_hour: 5,
            nano_second: 500_000_000,
            ..dt
        };
        assert_eq!(format_date_time(&west), "2005-12-25T12:42:42.5-05:00");
        assert_eq!(parse_date_time(&format_date_time(&west)), Some(west));
    }
}
