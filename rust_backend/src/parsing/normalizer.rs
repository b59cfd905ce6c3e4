use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::date_input::{classify_number, classify_text, DateInput};
use super::error::DateParseFailure;
use super::raw::RawDate;
use crate::time::{self, CalendarDate};

/// Tokens that appear in date cells but mean "no date yet".
///
/// Format hints are left behind by spreadsheet templates; the rest are common
/// manual-entry fillers. Matching is case-insensitive on the trimmed text.
pub const DEFAULT_PLACEHOLDERS: &[&str] = &[
    "dd/mm/yyyy",
    "dd/mm/yy",
    "mm/dd/yyyy",
    "yyyy-mm-dd",
    "dd-mm-yyyy",
    "dd.mm.yyyy",
    "n/a",
    "na",
    "-",
    "--",
    "tbc",
    "tba",
    "tbd",
    "null",
    "undefined",
    "none",
    "nan",
    "invalid date",
];

static DEFAULT_NORMALIZER: Lazy<DateNormalizer> = Lazy::new(DateNormalizer::new);

/// Converts heterogeneous raw date cells into [`CalendarDate`]s.
///
/// Interpretations are tried in a fixed order and the first match wins:
///
/// 1. empty or placeholder text
/// 2. typed instants
/// 3. numbers above `1e11` as epoch milliseconds
/// 4. numbers in `[19000101, 21001231]` as compact `YYYYMMDD`
/// 5. numbers in `[30000, 80000]` as spreadsheet serials
/// 6. any other number or all-digit string as epoch milliseconds
/// 7. `YYYY-MM-DD` (trailing time ignored)
/// 8. `DD-MM-YYYY`
/// 9. `DD.MM.YYYY`
/// 10. `D/M/Y` with exactly two slashes, day first
/// 11. a fixed list of free-form formats
///
/// The normalizer holds no mutable state and can be shared across threads.
///
/// # Examples
///
/// ```
/// use dealer_ops::parsing::DateNormalizer;
///
/// let normalizer = DateNormalizer::new();
/// let a = normalizer.parse("2025-02-15").unwrap();
/// let b = normalizer.parse("15/02/2025").unwrap();
/// let c = normalizer.parse(20250215_i64).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b, c);
/// ```
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    placeholders: HashSet<String>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DateNormalizer {
    /// Create a normalizer with [`DEFAULT_PLACEHOLDERS`].
    pub fn new() -> Self {
        Self {
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add extra placeholder tokens on top of the current set.
    pub fn with_placeholders<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.placeholders.extend(
            extra
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        self
    }

    /// Returns `true` if `text` is a known non-date token.
    pub fn is_placeholder(&self, text: &str) -> bool {
        self.placeholders.contains(&text.trim().to_lowercase())
    }

    /// Decide how a raw value should be interpreted, without converting it.
    pub fn classify<'a, R: Into<RawDate<'a>>>(&self, raw: R) -> DateInput {
        match raw.into() {
            RawDate::Missing => {
                DateInput::Unparseable(DateParseFailure::EmptyOrPlaceholder(String::new()))
            }
            RawDate::Instant(Some(dt)) => DateInput::Instant(dt),
            RawDate::Instant(None) => DateInput::Unparseable(DateParseFailure::InvalidInstant(
                "instant out of range".to_string(),
            )),
            RawDate::Number(n) => classify_number(n, &n.to_string()),
            RawDate::Other => DateInput::Unparseable(DateParseFailure::Unrecognized(
                RawDate::Other.describe(),
            )),
            RawDate::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() || self.is_placeholder(trimmed) {
                    return DateInput::Unparseable(DateParseFailure::EmptyOrPlaceholder(
                        trimmed.to_string(),
                    ));
                }
                if trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    return match trimmed.parse::<f64>() {
                        Ok(n) => classify_number(n, trimmed),
                        Err(_) => DateInput::Unparseable(DateParseFailure::Unrecognized(
                            trimmed.to_string(),
                        )),
                    };
                }
                classify_text(trimmed)
            }
        }
    }

    /// Parse a raw value into a calendar date.
    pub fn parse<'a, R: Into<RawDate<'a>>>(&self, raw: R) -> Result<CalendarDate, DateParseFailure> {
        self.classify(raw).resolve()
    }

    /// Parse, treating every failure as "no date".
    pub fn parse_opt<'a, R: Into<RawDate<'a>>>(&self, raw: R) -> Option<CalendarDate> {
        self.parse(raw).ok()
    }

    /// Whole days from `start` to `end`.
    ///
    /// `None` when either side fails to parse or when `end` precedes `start`.
    pub fn duration_days<'a, 'b, S, E>(&self, start: S, end: E) -> Option<i64>
    where
        S: Into<RawDate<'a>>,
        E: Into<RawDate<'b>>,
    {
        let start = self.parse_opt(start)?;
        let end = self.parse_opt(end)?;
        time::duration_days(start, end)
    }
}

/// Parse with the shared default normalizer.
pub fn parse_date<'a, R: Into<RawDate<'a>>>(raw: R) -> Result<CalendarDate, DateParseFailure> {
    DEFAULT_NORMALIZER.parse(raw)
}

/// Shared default normalizer, for callers that do not configure placeholders.
pub fn default_normalizer() -> &'static DateNormalizer {
    &DEFAULT_NORMALIZER
}
