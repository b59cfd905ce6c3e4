//! Calendar dates and calendar arithmetic.
//!
//! Every date comparison in the dashboard goes through [`CalendarDate`], a
//! day-precision value with no time-of-day or time-zone component.

pub mod calendar;

pub use calendar::{
    add_days, add_months, days_between, duration_days, format, half_month_start, month_start,
    today, week_start, CalendarDate, DateStyle,
};
