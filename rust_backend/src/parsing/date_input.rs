use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::DateParseFailure;
use crate::time::{add_days, CalendarDate};

/// Numbers above this are always epoch milliseconds.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Inclusive range of 8-digit `YYYYMMDD` integers.
pub const COMPACT_MIN: f64 = 19_000_101.0;
pub const COMPACT_MAX: f64 = 21_001_231.0;

/// Inclusive range treated as spreadsheet serial day counts.
pub const SERIAL_MIN: f64 = 30_000.0;
pub const SERIAL_MAX: f64 = 80_000.0;

static ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ]\d{1,2}:\d{2}.*)?$").expect("valid regex"));
static DASHED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4}|\d{2})$").expect("valid regex"));
static DOTTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})$").expect("valid regex"));

/// Formats tried, in order, for anything the explicit shapes did not catch.
const FREE_FORM_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const FREE_FORM_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%a %b %d %Y",
];

/// Spreadsheet day zero. Serial 1 is 1899-12-31.
fn spreadsheet_epoch() -> CalendarDate {
    CalendarDate::from(NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN))
}

/// The interpretation chosen for a raw date value.
///
/// Produced by [`DateNormalizer::classify`](super::DateNormalizer::classify)
/// following a fixed precedence so ambiguous inputs always resolve the same
/// way. Converting to a [`CalendarDate`] is a separate step ([`resolve`](Self::resolve))
/// which also validates the month/day combination.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Instant(DateTime<Utc>),
    EpochMillis(i64),
    /// `YYYYMMDD` packed into an integer.
    CompactNumeric(u32),
    /// Days since 1899-12-30; any fractional part is the time of day.
    SpreadsheetSerial(f64),
    IsoString { year: i32, month: u32, day: u32 },
    DashedString { day: u32, month: u32, year: i32 },
    DottedString { day: u32, month: u32, year: i32 },
    /// Day-first `D/M/Y`.
    SlashString { day: u32, month: u32, year: i32 },
    FreeForm(String),
    Unparseable(DateParseFailure),
}

impl DateInput {
    /// Convert to a calendar date, rejecting impossible month/day combinations.
    pub fn resolve(&self) -> Result<CalendarDate, DateParseFailure> {
        match self {
            DateInput::Instant(dt) => Ok(CalendarDate::from(dt.date_naive())),
            DateInput::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms)
                .map(|dt| CalendarDate::from(dt.date_naive()))
                .ok_or_else(|| DateParseFailure::InvalidInstant(format!("{} ms", ms))),
            DateInput::CompactNumeric(value) => {
                let year = (value / 10_000) as i32;
                let month = (value % 10_000) / 100;
                let day = value % 100;
                ymd(year, month, day)
            }
            DateInput::SpreadsheetSerial(serial) => {
                Ok(add_days(spreadsheet_epoch(), serial.floor() as i64))
            }
            DateInput::IsoString { year, month, day }
            | DateInput::DashedString { day, month, year }
            | DateInput::DottedString { day, month, year }
            | DateInput::SlashString { day, month, year } => ymd(*year, *month, *day),
            DateInput::FreeForm(text) => parse_free_form(text)
                .ok_or_else(|| DateParseFailure::Unrecognized(text.clone())),
            DateInput::Unparseable(failure) => Err(failure.clone()),
        }
    }

    /// Whether classification already gave up on this value.
    pub fn is_unparseable(&self) -> bool {
        matches!(self, DateInput::Unparseable(_))
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<CalendarDate, DateParseFailure> {
    CalendarDate::new(year, month, day).ok_or(DateParseFailure::InvalidCalendarDate {
        year: year as i64,
        month: month as i64,
        day: day as i64,
    })
}

/// Numeric ladder shared by real numbers and all-digit strings.
pub(crate) fn classify_number(value: f64, source: &str) -> DateInput {
    if !value.is_finite() {
        return DateInput::Unparseable(DateParseFailure::InvalidInstant(source.to_string()));
    }

    if value > EPOCH_MILLIS_THRESHOLD {
        DateInput::EpochMillis(value as i64)
    } else if (COMPACT_MIN..=COMPACT_MAX).contains(&value) {
        DateInput::CompactNumeric(value.trunc() as u32)
    } else if (SERIAL_MIN..=SERIAL_MAX).contains(&value) {
        DateInput::SpreadsheetSerial(value)
    } else {
        DateInput::EpochMillis(value.trunc() as i64)
    }
}

/// Shape-based classification for text that is neither empty, a placeholder
/// nor all digits.
pub(crate) fn classify_text(text: &str) -> DateInput {
    if let Some(caps) = ISO_RE.captures(text) {
        return match (
            caps[1].parse::<i32>(),
            caps[2].parse::<u32>(),
            caps[3].parse::<u32>(),
        ) {
            (Ok(year), Ok(month), Ok(day)) => DateInput::IsoString { year, month, day },
            _ => DateInput::Unparseable(DateParseFailure::Unrecognized(text.to_string())),
        };
    }

    if let Some((day, month, year)) = day_first_parts(&DASHED_RE, text) {
        return DateInput::DashedString { day, month, year };
    }

    if let Some((day, month, year)) = day_first_parts(&DOTTED_RE, text) {
        return DateInput::DottedString { day, month, year };
    }

    if text.matches('/').count() == 2 {
        if let Some((day, month, year)) = slash_parts(text) {
            return DateInput::SlashString { day, month, year };
        }
    }

    DateInput::FreeForm(text.to_string())
}

fn day_first_parts(re: &Regex, text: &str) -> Option<(u32, u32, i32)> {
    let caps = re.captures(text)?;
    let day = caps[1].parse::<u32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    let year = expand_year(&caps[3])?;
    Some((day, month, year))
}

fn slash_parts(text: &str) -> Option<(u32, u32, i32)> {
    let mut parts = text.split('/').map(str::trim);
    let day = digits(parts.next()?)?.parse::<u32>().ok()?;
    let month = digits(parts.next()?)?.parse::<u32>().ok()?;
    let year = expand_year(digits(parts.next()?)?)?;
    Some((day, month, year))
}

fn digits(part: &str) -> Option<&str> {
    (!part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())).then_some(part)
}

/// Two-digit years belong to the current century.
fn expand_year(part: &str) -> Option<i32> {
    let year: i32 = part.parse().ok()?;
    Some(if part.len() <= 2 { 2000 + year } else { year })
}

fn parse_free_form(text: &str) -> Option<CalendarDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(CalendarDate::from(dt.date_naive()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(CalendarDate::from(dt.date_naive()));
    }

    FREE_FORM_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            FREE_FORM_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
        .map(CalendarDate::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ladder_boundaries() {
        assert_eq!(classify_number(19_000_101.0, ""), DateInput::CompactNumeric(19_000_101));
        assert_eq!(classify_number(21_001_231.0, ""), DateInput::CompactNumeric(21_001_231));
        assert_eq!(classify_number(21_001_232.0, ""), DateInput::EpochMillis(21_001_232));
        assert_eq!(classify_number(30_000.0, ""), DateInput::SpreadsheetSerial(30_000.0));
        assert_eq!(classify_number(80_000.0, ""), DateInput::SpreadsheetSerial(80_000.0));
        assert_eq!(classify_number(29_999.0, ""), DateInput::EpochMillis(29_999));
        assert_eq!(
            classify_number(1_739_577_600_000.0, ""),
            DateInput::EpochMillis(1_739_577_600_000)
        );
    }

    #[test]
    fn test_non_finite_number() {
        assert!(classify_number(f64::NAN, "NaN").is_unparseable());
        assert!(classify_number(f64::INFINITY, "inf").is_unparseable());
    }

    #[test]
    fn test_compact_resolves_fields() {
        let date = DateInput::CompactNumeric(20250215).resolve().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 2, 15));
    }

    #[test]
    fn test_compact_rejects_wrapped_date() {
        assert_eq!(
            DateInput::CompactNumeric(20251332).resolve(),
            Err(DateParseFailure::InvalidCalendarDate { year: 2025, month: 13, day: 32 })
        );
    }

    #[test]
    fn test_serial_epoch() {
        let date = DateInput::SpreadsheetSerial(45703.0).resolve().unwrap();
        assert_eq!(date.to_string(), "2025-02-15");
        // Fractional part is time of day
        let date = DateInput::SpreadsheetSerial(45703.75).resolve().unwrap();
        assert_eq!(date.to_string(), "2025-02-15");
    }

    #[test]
    fn test_text_shapes() {
        assert_eq!(
            classify_text("2025-02-15"),
            DateInput::IsoString { year: 2025, month: 2, day: 15 }
        );
        assert_eq!(
            classify_text("2025-02-15T23:30:00-05:00"),
            DateInput::IsoString { year: 2025, month: 2, day: 15 }
        );
        assert_eq!(
            classify_text("15-02-2025"),
            DateInput::DashedString { day: 15, month: 2, year: 2025 }
        );
        assert_eq!(
            classify_text("15.02.2025"),
            DateInput::DottedString { day: 15, month: 2, year: 2025 }
        );
        assert_eq!(
            classify_text("15/02/25"),
            DateInput::SlashString { day: 15, month: 2, year: 2025 }
        );
        assert_eq!(classify_text("15 Feb 2025"), DateInput::FreeForm("15 Feb 2025".into()));
    }

    #[test]
    fn test_iso_prefix_needs_a_time_suffix() {
        assert_eq!(
            classify_text("2025-02-15 08:45"),
            DateInput::IsoString { year: 2025, month: 2, day: 15 }
        );
        assert_eq!(
            classify_text("2025-02-15 not a date at all"),
            DateInput::FreeForm("2025-02-15 not a date at all".into())
        );
    }

    #[test]
    fn test_slash_with_words_falls_through_to_free_form() {
        assert_eq!(classify_text("a/b/c"), DateInput::FreeForm("a/b/c".into()));
        assert!(DateInput::FreeForm("a/b/c".into()).resolve().is_err());
    }

    #[test]
    fn test_free_form_formats() {
        for text in ["15 February 2025", "Feb 15, 2025", "15-Feb-2025", "2025/02/15"] {
            let date = DateInput::FreeForm(text.into()).resolve().unwrap();
            assert_eq!(date.to_string(), "2025-02-15", "input {}", text);
        }
    }
}
