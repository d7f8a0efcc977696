// src/time_utils.rs
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

pub const SECONDS_PER_HOUR: i64 = 3600;
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const HOUR_FORMAT: &str = "%H:%M:%S";
const MOMENT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static MOMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^20\d{2}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])T([01]\d|2[0-3]):[0-5]\d:[0-5]\d$",
    )
    .expect("moment pattern is a valid regex")
});

static MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^20\d{2}-(0[1-9]|1[0-2])$").expect("month pattern is a valid regex"));

/// A punch timestamp split into its calendar day and time-of-day parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub day: NaiveDate,
    pub hour: NaiveTime,
}

impl Moment {
    pub fn day_string(&self) -> String {
        self.day.format(DATE_FORMAT).to_string()
    }

    pub fn hour_string(&self) -> String {
        self.hour.format(HOUR_FORMAT).to_string()
    }
}

/// Parses a `YYYY-MM-DDTHH:mm:ss` timestamp (year 20xx). Strings that match
/// the pattern but name an impossible date (e.g. `2023-02-30`) are rejected too.
pub fn parse_moment(raw: &str) -> Result<Moment, AppError> {
    if !MOMENT_PATTERN.is_match(raw) {
        return Err(AppError::InvalidFormat);
    }
    let parsed =
        NaiveDateTime::parse_from_str(raw, MOMENT_FORMAT).map_err(|_| AppError::InvalidFormat)?;
    Ok(Moment {
        day: parsed.date(),
        hour: parsed.time(),
    })
}

pub fn ensure_weekday(day: NaiveDate) -> Result<(), AppError> {
    match day.weekday() {
        Weekday::Sat | Weekday::Sun => Err(AppError::WeekendNotAllowed),
        _ => Ok(()),
    }
}

pub fn validate_month(raw: &str) -> Result<(), AppError> {
    if MONTH_PATTERN.is_match(raw) {
        Ok(())
    } else {
        Err(AppError::InvalidMonthFormat)
    }
}

/// `YYYY-MM` prefix of a `YYYY-MM-DD` day string.
pub fn month_string(day: &str) -> String {
    day.chars().take(7).collect()
}

/// Ex.: `08:00:00` -> 28800
pub fn hour_string_to_seconds(hour: &str) -> Result<i64, AppError> {
    let time = NaiveTime::parse_from_str(hour, HOUR_FORMAT)
        .map_err(|_| AppError::CorruptRecord(format!("invalid punch hour '{}'", hour)))?;
    Ok(i64::from(time.num_seconds_from_midnight()))
}

/// Renders seconds as an ISO-8601 duration: `0` -> `PT0S`, `3600` -> `PT1H0S`,
/// `252922` -> `PT70H15M22S`. Zero hours and zero minutes are omitted, the
/// seconds part is always present.
pub fn seconds_to_iso8601_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let magnitude = seconds.unsigned_abs();
    let hours = magnitude / 3600;
    let minutes = (magnitude % 3600) / 60;
    let secs = magnitude % 60;

    let mut out = format!("{}PT", sign);
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    out.push_str(&format!("{}S", secs));
    out
}
