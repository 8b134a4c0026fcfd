//! Date/time parsing and formatting.
//!
//! [`parse_instant`] accepts loosely specified timestamps and infers the
//! finest precision supplied:
//!
//! | Input | Interpreted as |
//! |---|---|
//! | `2017-11-01T14:30:00-07:00`, `...Z` | strict RFC 3339 |
//! | `2017-11-01T14:30:05` | local time, as given |
//! | `2017-11-01T14:30` | local time, `:00` seconds |
//! | `2017-11-01T14` | local time, `:00:00` |
//! | `2017-11-01` | local midnight |
//!
//! Anything else is an error.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::error::{Result, TabdumpError};

/// Per-entry timestamp format, after the Unix `date` layout.
///
/// Uses a numeric offset: chrono has no zone abbreviations for local time,
/// so `%Z` would print an offset there anyway and a name only in UTC.
pub const DEFAULT_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %z %Y";

/// Format used for the range heading.
pub const RANGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

const LOCAL_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f";

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+(?:[zZ]|[+\-]\d\d:\d\d)$").expect("valid regex"));
static SECOND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+[tT]\d\d:\d\d:\d\d").expect("valid regex"));
static MINUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+[tT]\d\d:\d\d").expect("valid regex"));
static HOUR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+[tT]\d\d").expect("valid regex"));

/// The precision recognised in an input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Full timestamp with a `Z` or `±HH:MM` offset.
    Offset,
    /// Local time with seconds.
    Second,
    /// Local time with hour and minute.
    Minute,
    /// Local time with only an hour.
    Hour,
    /// Date only; midnight.
    Day,
}

impl Precision {
    /// Classify an input string.
    #[must_use]
    pub fn detect(input: &str) -> Self {
        if OFFSET_RE.is_match(input) {
            Self::Offset
        } else if SECOND_RE.is_match(input) {
            Self::Second
        } else if MINUTE_RE.is_match(input) {
            Self::Minute
        } else if HOUR_RE.is_match(input) {
            Self::Hour
        } else {
            Self::Day
        }
    }

    /// Suffix that completes an input of this precision to full seconds.
    #[must_use]
    pub const fn completion(self) -> &'static str {
        match self {
            Self::Offset | Self::Second => "",
            Self::Minute => ":00",
            Self::Hour => ":00:00",
            Self::Day => "T00:00:00",
        }
    }
}

/// Parse a date/time string, resolving unqualified values in local time.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>> {
    parse_instant_in(input, &Local)
}

/// Parse a date/time string, resolving unqualified values in `tz`.
///
/// Local times that fall in a DST gap are rejected; ambiguous ones resolve
/// to the earlier instant.
pub fn parse_instant_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let precision = Precision::detect(input);
    trace!(input, ?precision, "parsing instant");

    if precision == Precision::Offset {
        return DateTime::parse_from_rfc3339(input)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| TabdumpError::time(input, e.to_string()));
    }

    let completed = format!("{}{}", input.replace('t', "T"), precision.completion());
    let naive = NaiveDateTime::parse_from_str(&completed, LOCAL_LAYOUT)
        .map_err(|e| TabdumpError::time(input, e.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TabdumpError::time(input, "local time does not exist in this time zone"))
}

/// Reject strftime patterns chrono cannot render.
pub fn validate_time_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(TabdumpError::invalid_argument(
            "time-format",
            format!("unsupported strftime pattern: {format}"),
        ));
    }
    Ok(())
}

/// Time zone used when rendering timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The process's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

impl DisplayZone {
    /// Render an instant with a (previously validated) strftime pattern.
    #[must_use]
    pub fn format(self, instant: &DateTime<Utc>, format: &str) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(format).to_string(),
            Self::Utc => instant.format(format).to_string(),
        }
    }

    /// Render a millisecond timestamp at whole-second precision.
    ///
    /// Values outside chrono's range are rendered as the raw number.
    #[must_use]
    pub fn format_millis(self, millis: i64, format: &str) -> String {
        DateTime::from_timestamp(millis.div_euclid(1000), 0)
            .map_or_else(|| millis.to_string(), |dt| self.format(&dt, format))
    }
}
