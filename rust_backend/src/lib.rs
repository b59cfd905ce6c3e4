//! Dealer operations analytics core.
//!
//! Date normalization and time-bucket aggregation for the dealer dashboard:
//! production scheduling, yard inventory trends and stock ageing.
//!
//! # Example
//!
//! ```
//! use dealer_ops::core::TimestampedRecord;
//! use dealer_ops::services::weekly_levels;
//! use dealer_ops::time::CalendarDate;
//!
//! let arrivals = vec![TimestampedRecord::new("2025-01-14")];
//! let anchor = CalendarDate::new(2025, 1, 20).unwrap();
//!
//! let weeks = weekly_levels(&arrivals, &[], 4, 2, anchor);
//! assert_eq!(weeks.iter().map(|w| w.level).collect::<Vec<_>>(), vec![4, 4]);
//! ```

pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod services;
pub mod time;

pub use config::{ConfigError, DashboardConfig};
pub use parsing::{parse_date, DateNormalizer, DateParseFailure};
pub use services::{DashboardReport, TimeBucketAggregator};
pub use time::CalendarDate;
