use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Store timestamp objects arrive with either of these key pairs.
const SECONDS_KEYS: &[&str] = &["seconds", "_seconds"];
const NANOS_KEYS: &[&str] = &["nanoseconds", "_nanoseconds"];

/// A raw, not-yet-interpreted date cell as it comes out of a record.
///
/// Upstream sources emit dates as strings, numbers or timestamp objects
/// depending on where the row originated (manual entry, spreadsheet import,
/// prior-system export). `RawDate` borrows the cell without committing to an
/// interpretation; [`DateNormalizer::classify`](super::DateNormalizer::classify)
/// decides what it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawDate<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
    /// An already-typed instant. `None` means the instant itself was invalid.
    Instant(Option<DateTime<Utc>>),
    /// Any other JSON shape (booleans, arrays, unrelated objects).
    Other,
}

impl RawDate<'_> {
    /// Short rendering of the raw value for error messages.
    pub fn describe(&self) -> String {
        match self {
            RawDate::Missing => String::new(),
            RawDate::Text(s) => (*s).to_string(),
            RawDate::Number(n) => n.to_string(),
            RawDate::Instant(Some(dt)) => dt.to_rfc3339(),
            RawDate::Instant(None) => "<invalid instant>".to_string(),
            RawDate::Other => "<non-date value>".to_string(),
        }
    }
}

impl<'a> From<&'a str> for RawDate<'a> {
    fn from(s: &'a str) -> Self {
        RawDate::Text(s)
    }
}

impl<'a> From<&'a String> for RawDate<'a> {
    fn from(s: &'a String) -> Self {
        RawDate::Text(s.as_str())
    }
}

impl From<i64> for RawDate<'_> {
    fn from(n: i64) -> Self {
        RawDate::Number(n as f64)
    }
}

impl From<f64> for RawDate<'_> {
    fn from(n: f64) -> Self {
        RawDate::Number(n)
    }
}

impl From<DateTime<Utc>> for RawDate<'_> {
    fn from(dt: DateTime<Utc>) -> Self {
        RawDate::Instant(Some(dt))
    }
}

impl From<NaiveDate> for RawDate<'_> {
    fn from(date: NaiveDate) -> Self {
        RawDate::Instant(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()))
    }
}

impl<'a, T: Into<RawDate<'a>>> From<Option<T>> for RawDate<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawDate::Missing, Into::into)
    }
}

impl<'a> From<&'a Value> for RawDate<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => RawDate::Missing,
            Value::String(s) => RawDate::Text(s.as_str()),
            Value::Number(n) => n.as_f64().map_or(RawDate::Other, RawDate::Number),
            Value::Object(obj) => match find_i64(obj, SECONDS_KEYS) {
                Some(secs) => {
                    let nanos = find_i64(obj, NANOS_KEYS).unwrap_or(0);
                    let instant = u32::try_from(nanos)
                        .ok()
                        .and_then(|n| DateTime::from_timestamp(secs, n));
                    RawDate::Instant(instant)
                }
                None => RawDate::Other,
            },
            Value::Bool(_) | Value::Array(_) => RawDate::Other,
        }
    }
}

fn find_i64(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .find_map(|key| obj.get(*key))
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
}
