//! Domain models for dealer records and the buckets they are aggregated into.
//!
//! Records are read-only snapshots handed in by the caller; every bucket type
//! here is recomputed from scratch on each aggregation call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parsing::RawDate;
use crate::time::CalendarDate;

/// Ordered candidate keys for one logical date column.
///
/// Rows written by different screens and imports spell the same column
/// differently; the first key present on a row wins.
///
/// # Examples
///
/// ```
/// use dealer_ops::core::domain::DateField;
/// use serde_json::json;
///
/// let row = json!({"received_at": "2025-02-15"});
/// let value = DateField::RECEIVED_AT.find(row.as_object().unwrap());
/// assert_eq!(value, Some(&json!("2025-02-15")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateField(Vec<String>);

/// Keys for the date a vehicle arrived in the yard
const RECEIVED_KEYS: &[&str] = &["receivedAt", "received_at", "dateReceived", "arrivalDate"];

/// Keys for the date a vehicle left the yard
const HANDOVER_KEYS: &[&str] = &["handoverAt", "handover_at", "handoverDate", "deliveredAt"];

/// Keys for the date the signed customer order came in
const SIGNED_ORDER_KEYS: &[&str] = &[
    "signedOrderReceived",
    "signed_order_received",
    "orderSignedAt",
];

/// Keys for the scheduled production date
const PRODUCTION_KEYS: &[&str] = &["productionDate", "production_date", "buildDate", "plannedBuild"];

impl DateField {
    pub const RECEIVED_AT: DateFieldRef = DateFieldRef(RECEIVED_KEYS);
    pub const HANDOVER_AT: DateFieldRef = DateFieldRef(HANDOVER_KEYS);
    pub const SIGNED_ORDER_RECEIVED: DateFieldRef = DateFieldRef(SIGNED_ORDER_KEYS);
    pub const PRODUCTION_DATE: DateFieldRef = DateFieldRef(PRODUCTION_KEYS);

    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// First present, non-null value among the candidate keys.
    pub fn find<'a>(&self, row: &'a Map<String, Value>) -> Option<&'a Value> {
        find_by_keys(row, self.keys())
    }
}

/// Borrowed, compile-time list of candidate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFieldRef(&'static [&'static str]);

impl DateFieldRef {
    pub fn find<'a>(&self, row: &'a Map<String, Value>) -> Option<&'a Value> {
        find_by_keys(row, self.0.iter().copied())
    }

    pub fn to_field(&self) -> DateField {
        DateField::new(self.0.iter().copied())
    }
}

impl From<DateFieldRef> for DateField {
    fn from(field: DateFieldRef) -> Self {
        field.to_field()
    }
}

fn find_by_keys<'a, 'k>(
    row: &'a Map<String, Value>,
    mut keys: impl Iterator<Item = &'k str>,
) -> Option<&'a Value> {
    keys.find_map(|key| row.get(key).filter(|v| !v.is_null()))
}

/// A source row carrying one relevant date plus an optional category tag.
///
/// `date` keeps the raw cell exactly as stored; it is only interpreted when
/// an aggregation asks for it. `fields` holds the whole row so classification
/// closures can look at anything else (dealer, model, status).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl TimestampedRecord {
    /// Record with just a raw date.
    pub fn new(date: impl Into<Value>) -> Self {
        Self {
            id: None,
            date: date.into(),
            category: None,
            fields: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Build from a stored row, picking the date from `date_field` and the
    /// category from `category_key` (strings and numbers are accepted).
    pub fn from_row(
        id: Option<String>,
        row: Map<String, Value>,
        date_field: &DateField,
        category_key: Option<&str>,
    ) -> Self {
        let date = date_field.find(&row).cloned().unwrap_or(Value::Null);
        let category = category_key
            .and_then(|key| row.get(key))
            .and_then(value_as_label);
        let id = id.or_else(|| row.get("id").and_then(value_as_label));

        Self {
            id,
            date,
            category,
            fields: row,
        }
    }

    /// Borrow the raw date for normalization.
    pub fn raw_date(&self) -> RawDate<'_> {
        RawDate::from(&self.date)
    }

    /// Look up any other field of the row.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a date column of the row by candidate keys.
    pub fn date_of(&self, field: &DateField) -> RawDate<'_> {
        field.find(&self.fields).map_or(RawDate::Missing, RawDate::from)
    }
}

fn value_as_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Width of the buckets a level series is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketSpan {
    /// Monday-anchored seven-day weeks.
    #[default]
    Week,
    /// The 1st–15th and the 16th–end of each month.
    HalfMonth,
}

/// One bucket of a reconstructed inventory series: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub start: CalendarDate,
    /// Exclusive.
    pub end: CalendarDate,
    pub arrivals: usize,
    pub departures: usize,
    /// `arrivals - departures`
    pub net_change: i64,
    /// Inferred inventory at the end of the bucket, never negative.
    pub level: i64,
}

pub type WeekBucket = TimeBucket;

/// A level series plus what was left out of it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelSeries {
    pub span: BucketSpan,
    pub buckets: Vec<TimeBucket>,
    /// Arrivals whose date could not be parsed.
    pub undated_arrivals: usize,
    /// Departures whose date could not be parsed.
    pub undated_departures: usize,
    /// Dated events that fell before the first or after the last bucket.
    pub outside_window: usize,
}

impl LevelSeries {
    pub fn excluded(&self) -> usize {
        self.undated_arrivals + self.undated_departures
    }

    pub fn levels(&self) -> Vec<i64> {
        self.buckets.iter().map(|b| b.level).collect()
    }
}

/// An inclusive day-count interval used to classify record age.
///
/// `max: None` leaves the range open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgeRange {
    pub label: String,
    pub min: i64,
    #[serde(default)]
    pub max: Option<i64>,
}

impl AgeRange {
    pub fn new(label: impl Into<String>, min: i64, max: Option<i64>) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    /// Range labelled `"{min}-{max}"` (or `"{min}+"` when open).
    pub fn span(min: i64, max: Option<i64>) -> Self {
        let label = match max {
            Some(max) => format!("{}-{}", min, max),
            None => format!("{}+", min),
        };
        Self::new(label, min, max)
    }

    pub fn contains(&self, age_days: i64) -> bool {
        age_days >= self.min && self.max.map_or(true, |max| age_days <= max)
    }

    /// 0–30, 31–90, 91–180, 181+
    pub fn default_ranges() -> Vec<AgeRange> {
        vec![
            AgeRange::span(0, Some(30)),
            AgeRange::span(31, Some(90)),
            AgeRange::span(91, Some(180)),
            AgeRange::span(181, None),
        ]
    }

    /// Check that `ranges` cover `[0, ∞)` in order with no gaps or overlaps.
    ///
    /// Only the last range may be open-ended. A bounded last range is
    /// accepted: ages beyond it simply land in no bucket.
    pub fn validate_partition(ranges: &[AgeRange]) -> Result<(), PartitionError> {
        let first = ranges.first().ok_or(PartitionError::Empty)?;
        if first.min != 0 {
            return Err(PartitionError::DoesNotStartAtZero(first.min));
        }

        for (i, range) in ranges.iter().enumerate() {
            if let Some(max) = range.max {
                if max < range.min {
                    return Err(PartitionError::Inverted(range.label.clone()));
                }
            }

            let Some(next) = ranges.get(i + 1) else {
                break;
            };

            let Some(max) = range.max else {
                return Err(PartitionError::OpenBeforeEnd(range.label.clone()));
            };

            if next.min <= max {
                return Err(PartitionError::Overlap(range.label.clone(), next.label.clone()));
            }
            if next.min > max + 1 {
                return Err(PartitionError::Gap(range.label.clone(), next.label.clone()));
            }
        }

        Ok(())
    }
}

/// Why a set of age ranges is not a partition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("no age ranges configured")]
    Empty,

    #[error("first age range starts at {0}, expected 0")]
    DoesNotStartAtZero(i64),

    #[error("age range '{0}' has max below min")]
    Inverted(String),

    #[error("age range '{0}' is open-ended but is not the last range")]
    OpenBeforeEnd(String),

    #[error("age ranges '{0}' and '{1}' overlap")]
    Overlap(String, String),

    #[error("gap between age ranges '{0}' and '{1}'")]
    Gap(String, String),
}

/// Number of records in one age range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBucketCount {
    pub range: AgeRange,
    pub count: usize,
}

/// Size of one category relative to the whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryShare {
    pub count: usize,
    /// Whole-number percentage, rounded half up.
    pub percent: u32,
}
