//! Failure reasons for date normalization.

/// Why a raw value could not be turned into a calendar date.
///
/// Callers normally treat any of these as "no date", but the reason stays
/// distinguishable so exclusions can be counted and tested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseFailure {
    #[error("empty or placeholder date: {0:?}")]
    EmptyOrPlaceholder(String),

    #[error("invalid instant: {0}")]
    InvalidInstant(String),

    #[error("invalid calendar date: year {year}, month {month}, day {day}")]
    InvalidCalendarDate { year: i64, month: i64, day: i64 },

    #[error("unrecognized date: {0:?}")]
    Unrecognized(String),
}
