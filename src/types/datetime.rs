//! Date/time values
//!
//! The engine exchanges dates as component fields plus a signed timezone
//! offset. [`XmpDateTime`] keeps those fields as they were stored and
//! [`XmpDateTime::to_utc`] turns them into an absolute instant.

use crate::core::error::{XmpError, XmpResult};
use crate::engine::RawDateTime;
use chrono::{Datelike, DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a timezone offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TzSign {
    /// Behind UTC
    West,
    /// UTC itself
    #[default]
    Utc,
    /// Ahead of UTC
    East,
}

impl TzSign {
    pub fn raw(self) -> i32 {
        match self {
            TzSign::West => -1,
            TzSign::Utc => 0,
            TzSign::East => 1,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -1 => Some(TzSign::West),
            0 => Some(TzSign::Utc),
            1 => Some(TzSign::East),
            _ => None,
        }
    }
}

/// XMP date/time value
///
/// Month and day may be zero for partial dates (`"2006"`, `"2006-12"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XmpDateTime {
    pub year: i32,
    /// 1-12, 0 when absent
    pub month: u8,
    /// 1-31, 0 when absent
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
    pub tz_sign: TzSign,
    pub tz_hour: u8,
    pub tz_minute: u8,
}

impl XmpDateTime {
    /// A UTC date/time
    pub fn utc(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            ..Self::default()
        }
    }

    /// The same fields with an explicit offset
    pub fn with_offset(mut self, sign: TzSign, hour: u8, minute: u8) -> Self {
        self.tz_sign = sign;
        self.tz_hour = hour;
        self.tz_minute = minute;
        self
    }

    /// Offset from UTC in seconds, signed
    pub fn offset_seconds(&self) -> i64 {
        i64::from(self.tz_sign.raw())
            * (i64::from(self.tz_hour) * 3600 + i64::from(self.tz_minute) * 60)
    }

    /// The absolute instant these fields denote
    ///
    /// The fields are read as a local time at the stored offset, so the
    /// offset is subtracted to reach UTC. Missing month or day count as 1.
    pub fn to_utc(&self) -> XmpResult<DateTime<Utc>> {
        let invalid = || XmpError::BadParam(format!("invalid date/time: {:?}", self));
        let naive = NaiveDate::from_ymd_opt(
            self.year,
            u32::from(self.month.max(1)),
            u32::from(self.day.max(1)),
        )
        .and_then(|date| {
            date.and_hms_nano_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
                self.nanosecond,
            )
        })
        .ok_or_else(invalid)?;
        let utc = naive
            .checked_sub_signed(Duration::seconds(self.offset_seconds()))
            .ok_or_else(invalid)?;
        Ok(Utc.from_utc_datetime(&utc))
    }

    /// Fields of a chrono date/time at its own offset
    pub fn from_chrono<Tz: TimeZone>(value: &DateTime<Tz>) -> Self {
        let fixed: DateTime<FixedOffset> = value.fixed_offset();
        let offset = fixed.offset().local_minus_utc();
        let sign = match offset.signum() {
            -1 => TzSign::West,
            1 => TzSign::East,
            _ => TzSign::Utc,
        };
        let abs = offset.unsigned_abs();
        Self {
            year: fixed.year(),
            month: fixed.month() as u8,
            day: fixed.day() as u8,
            hour: fixed.hour() as u8,
            minute: fixed.minute() as u8,
            second: fixed.second() as u8,
            // leap seconds are folded into the last nanosecond
            nanosecond: fixed.nanosecond().min(999_999_999),
            tz_sign: sign,
            tz_hour: (abs / 3600) as u8,
            tz_minute: (abs % 3600 / 60) as u8,
        }
    }
}

impl From<XmpDateTime> for RawDateTime {
    fn from(value: XmpDateTime) -> Self {
        RawDateTime {
            year: value.year,
            month: i32::from(value.month),
            day: i32::from(value.day),
            hour: i32::from(value.hour),
            minute: i32::from(value.minute),
            second: i32::from(value.second),
            tz_sign: value.tz_sign.raw(),
            tz_hour: i32::from(value.tz_hour),
            tz_minute: i32::from(value.tz_minute),
            nano_second: value.nanosecond as i32,
        }
    }
}

impl TryFrom<RawDateTime> for XmpDateTime {
    type Error = XmpError;

    fn try_from(raw: RawDateTime) -> XmpResult<Self> {
        let field = |name: &str, value: i32, max: i32| -> XmpResult<u8> {
            if (0..=max).contains(&value) {
                Ok(value as u8)
            } else {
                Err(XmpError::BadParam(format!(
                    "date/time field {} out of range: {}",
                    name, value
                )))
            }
        };
        let tz_sign = TzSign::from_raw(raw.tz_sign).ok_or_else(|| {
            XmpError::BadParam(format!("invalid timezone sign: {}", raw.tz_sign))
        })?;
        if !(0..=999_999_999).contains(&raw.nano_second) {
            return Err(XmpError::BadParam(format!(
                "date/time field nanosecond out of range: {}",
                raw.nano_second
            )));
        }
        Ok(Self {
            year: raw.year,
            month: field("month", raw.month, 12)?,
            day: field("day", raw.day, 31)?,
            hour: field("hour", raw.hour, 23)?,
            minute: field("minute", raw.minute, 59)?,
            second: field("second", raw.second, 60)?,
            nanosecond: raw.nano_second as u32,
            tz_sign,
            tz_hour: field("tz_hour", raw.tz_hour, 23)?,
            tz_minute: field("tz_minute", raw.tz_minute, 59)?,
        })
    }
}
