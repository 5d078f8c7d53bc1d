//! Date horizon arithmetic for donation expiry dates.
//!
//! Everything here is a pure function of a target date and an injected
//! "now". The offset of `now` is treated as the local zone: both sides are
//! normalized to midnight in that offset before they are compared.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

use crate::error::{Error, Result};

const MILLIS_PER_DAY: i128 = 86_400_000;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Reads the host clock, preferring the local offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        match OffsetDateTime::now_local() {
            Ok(now) => now,
            Err(err) => {
                tracing::debug!(?err, "local offset unavailable, using UTC");
                OffsetDateTime::now_utc()
            }
        }
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Whole days from today until `target`, both taken at midnight in the
/// offset of `now`. Negative when the target is past due.
pub fn days_until(target: Date, now: OffsetDateTime) -> i64 {
    let offset = now.offset();
    let today_midnight = now.date().midnight().assume_offset(offset);
    let target_midnight = target.midnight().assume_offset(offset);
    ceil_days(target_midnight - today_midnight)
}

/// Parses `input` as a date and returns [`days_until`] for it.
pub fn days_until_input(input: &str, now: OffsetDateTime) -> Result<i64> {
    let target = parse_target(input, now)?;
    Ok(days_until(target, now))
}

/// Rounds a span up to whole days.
///
/// Fractional spans always move toward the larger count: +12h is one day,
/// -12h is zero days.
pub fn ceil_days(span: Duration) -> i64 {
    let millis = span.whole_milliseconds();
    let mut days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) != 0 {
        days += 1;
    }
    i64::try_from(days).unwrap_or(if days < 0 { i64::MIN } else { i64::MAX })
}

/// True once the target date lies strictly before today.
pub fn is_expired(target: Date, now: OffsetDateTime) -> bool {
    target < now.date()
}

/// Parses a date-like string into a calendar date.
///
/// Accepts `2026-10-19`, `2026-10-19 14:30:00`, local form timestamps such
/// as `2026-10-19T14:30`, RFC 3339 timestamps and the long form written by
/// [`format_long`]. Timestamps carrying their own offset are moved into the
/// offset of `now` before the time is dropped.
pub fn parse_target(input: &str, now: OffsetDateTime) -> Result<Date> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_date(input));
    }
    if let Ok(date) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        return Ok(date);
    }
    if let Ok(stamp) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(stamp.to_offset(now.offset()).date());
    }
    if let Ok(stamp) = PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(stamp.date());
    }
    if let Ok(stamp) = PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day]T[hour]:[minute][optional [:[second]]]"),
    ) {
        return Ok(stamp.date());
    }
    if let Ok(date) = Date::parse(
        trimmed,
        format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    ) {
        return Ok(date);
    }
    Err(Error::invalid_date(input))
}

/// `October 19, 2026`
pub fn format_long(date: Date) -> String {
    date.format(format_description!(
        "[month repr:long] [day padding:none], [year]"
    ))
    .unwrap_or_else(|_| format_iso(date))
}

/// `2026-10-19`
pub fn format_iso(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
