use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A specific calendar day with no time-of-day component.
///
/// All comparisons in the dashboard are done on `CalendarDate`s, so two
/// values are equal exactly when year, month and day match.
///
/// # Examples
///
/// ```
/// use dealer_ops::time::CalendarDate;
///
/// let date = CalendarDate::new(2025, 2, 15).unwrap();
/// assert_eq!(date.to_string(), "2025-02-15");
/// assert!(CalendarDate::new(2025, 2, 30).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Earliest representable date. Backward arithmetic saturates here.
    pub const MIN: CalendarDate = CalendarDate(NaiveDate::MIN);

    /// Create a date, returning `None` when the month/day combination does not exist.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Underlying chrono date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(*self, DateStyle::Iso))
    }
}

/// Display styles used by the dashboard grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// `YYYY-MM-DD`
    Iso,
    /// `DD/MM/YYYY`
    DayFirst,
}

/// Render a date in the requested style. Month and day are always zero-padded.
pub fn format(date: CalendarDate, style: DateStyle) -> String {
    match style {
        DateStyle::Iso => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
        DateStyle::DayFirst => {
            format!("{:02}/{:02}/{:04}", date.day(), date.month(), date.year())
        }
    }
}

/// Shift a date by `delta` days (negative moves backwards).
///
/// Saturates at the limits of the representable calendar instead of panicking.
pub fn add_days(date: CalendarDate, delta: i64) -> CalendarDate {
    let shifted = Duration::try_days(delta).and_then(|d| date.0.checked_add_signed(d));
    match shifted {
        Some(d) => CalendarDate(d),
        None if delta < 0 => CalendarDate(NaiveDate::MIN),
        None => CalendarDate(NaiveDate::MAX),
    }
}

/// Move `delta` months from the month containing `date`, landing on the 1st.
///
/// Day-of-month is never preserved: the scheduling views only step between
/// month boundaries.
pub fn add_months(date: CalendarDate, delta: i32) -> CalendarDate {
    let index = date.year() as i64 * 12 + (date.month() as i64 - 1) + delta as i64;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;

    i32::try_from(year)
        .ok()
        .and_then(|y| CalendarDate::new(y, month, 1))
        .unwrap_or(if delta < 0 {
            CalendarDate(NaiveDate::MIN)
        } else {
            CalendarDate(NaiveDate::MAX)
        })
}

/// Signed number of whole days from `start` to `end`.
pub fn days_between(start: CalendarDate, end: CalendarDate) -> i64 {
    (end.0 - start.0).num_days()
}

/// Days from `start` to `end`, or `None` when `end` falls before `start`.
///
/// Durations are never reported as negative; a reversed pair is "not yet
/// meaningful" rather than an error.
pub fn duration_days(start: CalendarDate, end: CalendarDate) -> Option<i64> {
    let days = days_between(start, end);
    (days >= 0).then_some(days)
}

/// Monday on or before `date`.
pub fn week_start(date: CalendarDate) -> CalendarDate {
    add_days(date, -(date.weekday().num_days_from_monday() as i64))
}

/// First day of the half-month containing `date` (the 1st or the 16th).
pub fn half_month_start(date: CalendarDate) -> CalendarDate {
    let day = if date.day() >= 16 { 16 } else { 1 };
    CalendarDate::new(date.year(), date.month(), day).unwrap_or(date)
}

/// First day of the month containing `date`.
pub fn month_start(date: CalendarDate) -> CalendarDate {
    add_months(date, 0)
}

/// Today's date on the local clock.
pub fn today() -> CalendarDate {
    CalendarDate(Local::now().date_naive())
}
