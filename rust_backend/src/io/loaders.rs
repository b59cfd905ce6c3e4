use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::core::domain::{DateField, TimestampedRecord};

/// Collection keys a wrapped snapshot may store its rows under.
const COLLECTION_KEYS: &[&str] = &["records", "vehicles", "stock", "items", "data"];

/// Shape the rows were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotLayout {
    /// `[ {...}, {...} ]`
    Array,
    /// `{ "doc-id": {...}, ... }`
    Keyed,
    /// `{ "vehicles": [...] }` or `{ "vehicles": { "doc-id": {...} } }`
    Wrapped,
}

/// One document from the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub id: Option<String>,
    pub fields: Map<String, Value>,
}

/// Rows read from a snapshot file.
///
/// Array layouts keep document order. Keyed layouts come back sorted by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub layout: SnapshotLayout,
    pub rows: Vec<SnapshotRow>,
    /// Entries that were not JSON objects.
    pub skipped: usize,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project every row onto one date column and an optional category column.
    pub fn records(&self, date_field: &DateField, category_key: Option<&str>) -> Vec<TimestampedRecord> {
        self.rows
            .iter()
            .map(|row| {
                TimestampedRecord::from_row(row.id.clone(), row.fields.clone(), date_field, category_key)
            })
            .collect()
    }

    /// Like [`Self::records`], restricted to rows where `date_field` has a value.
    pub fn records_with(&self, date_field: &DateField, category_key: Option<&str>) -> Vec<TimestampedRecord> {
        self.rows
            .iter()
            .filter(|row| date_field.find(&row.fields).is_some())
            .map(|row| {
                TimestampedRecord::from_row(row.id.clone(), row.fields.clone(), date_field, category_key)
            })
            .collect()
    }
}

/// Loads record-store snapshots exported as JSON.
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Load a snapshot from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Snapshot> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;

        Self::load_from_str(&content)
            .with_context(|| format!("Failed to load snapshot from {}", path.display()))
    }

    /// Load a snapshot from a JSON string
    pub fn load_from_str(json_str: &str) -> Result<Snapshot> {
        let value: Value = serde_json::from_str(json_str).context("Failed to parse snapshot JSON")?;
        Self::load_from_value(value)
    }

    /// Load a snapshot from an already parsed JSON value
    ///
    /// An object is read as wrapped only when one of the collection keys holds
    /// an array or an object of objects and no other entry is an object.
    /// Anything else is a keyed snapshot, collection keys included.
    pub fn load_from_value(value: Value) -> Result<Snapshot> {
        match value {
            Value::Array(items) => Ok(collect_array(items, SnapshotLayout::Array)),
            Value::Object(mut map) => match wrapped_collection_key(&map) {
                Some(key) => match map.remove(key) {
                    Some(Value::Array(items)) => Ok(collect_array(items, SnapshotLayout::Wrapped)),
                    Some(Value::Object(docs)) => Ok(collect_keyed(docs, SnapshotLayout::Wrapped)),
                    _ => Ok(collect_keyed(map, SnapshotLayout::Keyed)),
                },
                None => Ok(collect_keyed(map, SnapshotLayout::Keyed)),
            },
            other => anyhow::bail!(
                "Snapshot must be a JSON array or object, found {}",
                json_kind(&other)
            ),
        }
    }
}

fn wrapped_collection_key(map: &Map<String, Value>) -> Option<&'static str> {
    let key = COLLECTION_KEYS.iter().copied().find(|key| match map.get(*key) {
        Some(Value::Array(_)) => true,
        Some(Value::Object(docs)) => docs.values().all(Value::is_object),
        _ => false,
    })?;

    let siblings_are_metadata = map
        .iter()
        .filter(|(name, _)| name.as_str() != key)
        .all(|(_, value)| !value.is_object());

    siblings_are_metadata.then_some(key)
}

fn collect_array(items: Vec<Value>, layout: SnapshotLayout) -> Snapshot {
    let mut rows = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in items {
        match item {
            Value::Object(fields) => rows.push(SnapshotRow { id: None, fields }),
            other => {
                log::warn!("Skipping snapshot entry that is not an object: {}", json_kind(&other));
                skipped += 1;
            }
        }
    }

    Snapshot { layout, rows, skipped }
}

fn collect_keyed(docs: Map<String, Value>, layout: SnapshotLayout) -> Snapshot {
    let mut rows = Vec::with_capacity(docs.len());
    let mut skipped = 0;

    for (id, doc) in docs {
        match doc {
            Value::Object(fields) => rows.push(SnapshotRow { id: Some(id), fields }),
            other => {
                log::warn!("Skipping document '{}': expected object, found {}", id, json_kind(&other));
                skipped += 1;
            }
        }
    }

    Snapshot { layout, rows, skipped }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
