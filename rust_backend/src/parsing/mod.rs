//! Date normalization for dealer records.
//!
//! Date cells reach the dashboard in many shapes: ISO strings typed into the
//! grids, day-first strings from dealer exports, packed `YYYYMMDD` integers,
//! spreadsheet serial numbers, epoch milliseconds and store timestamp objects.
//! This module turns all of them into [`CalendarDate`](crate::time::CalendarDate)s.
//!
//! # Pieces
//!
//! - [`raw`]: [`RawDate`], a borrowed view of a raw cell
//! - [`date_input`]: [`DateInput`], the interpretation chosen for a cell
//! - [`normalizer`]: [`DateNormalizer`], which applies the precedence rules
//! - [`error`]: [`DateParseFailure`]
//!
//! # Example
//!
//! ```
//! use dealer_ops::parsing::{parse_date, DateParseFailure};
//!
//! let date = parse_date("15.02.2025").unwrap();
//! assert_eq!(date.to_string(), "2025-02-15");
//!
//! assert!(matches!(
//!     parse_date("DD/MM/YYYY"),
//!     Err(DateParseFailure::EmptyOrPlaceholder(_))
//! ));
//! ```

pub mod date_input;
pub mod error;
pub mod normalizer;
pub mod raw;


pub use date_input::DateInput;
pub use error::DateParseFailure;
pub use normalizer::{default_normalizer, parse_date, DateNormalizer, DEFAULT_PLACEHOLDERS};
pub use raw::RawDate;
