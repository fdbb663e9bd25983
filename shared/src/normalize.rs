//! Normalization of loosely-typed field documents
//!
//! Field documents exported from the hosted document store spell the same
//! concept several ways (`plantingDate`, `planting_date`, `datePlanted`, ...)
//! and store dates as strings, epoch milliseconds or `{ seconds }` timestamp
//! objects. This module turns such a document into a [`PlantingRecord`] once,
//! at the persistence boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::PlantingRecord;

const PLANTING_DATE_KEYS: &[&str] = &[
    "plantingDate",
    "planting_date",
    "datePlanted",
    "plantedAt",
    "planted_on",
];
const VARIETY_KEYS: &[&str] = &["variety", "sugarcaneVariety", "caneVariety", "varietyName"];
const BASAL_DATE_KEYS: &[&str] = &[
    "basalFertilizationDate",
    "basal_fertilization_date",
    "basalFertilizerDate",
    "basalDate",
];
const MAIN_DATE_KEYS: &[&str] = &[
    "mainFertilizationDate",
    "main_fertilization_date",
    "mainFertilizerDate",
    "mainDate",
];
const COMPLETED_TASK_KEYS: &[&str] = &["completedTasks", "completed_tasks", "completedTaskLabels"];
const TASK_LABEL_KEYS: &[&str] = &["label", "task", "taskType", "name"];

/// Errors raised while normalizing a field document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("field document must be a JSON object")]
    NotAnObject,

    #[error("invalid date in `{field}`: {value}")]
    InvalidDate { field: String, value: String },

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// Normalize a JSON document into a planting record.
///
/// A missing planting date is not an error; the record is simply unplanted.
pub fn normalize_field_document(document: &Value) -> Result<PlantingRecord, DocumentError> {
    let object = document.as_object().ok_or(DocumentError::NotAnObject)?;

    let mut record = PlantingRecord {
        planting_date: date_field(object, PLANTING_DATE_KEYS)?,
        variety: first_present(object, VARIETY_KEYS)
            .and_then(|(_, value)| value.as_str())
            .map(|variety| variety.trim().to_string())
            .unwrap_or_default(),
        basal_fertilization_date: date_field(object, BASAL_DATE_KEYS)?,
        main_fertilization_date: date_field(object, MAIN_DATE_KEYS)?,
        ..Default::default()
    };

    if let Some((_, Value::Array(tasks))) = first_present(object, COMPLETED_TASK_KEYS) {
        record.completed_task_labels = tasks.iter().filter_map(task_label).collect();
    }

    Ok(record)
}

/// Parse and normalize a JSON string
pub fn normalize_field_json(json: &str) -> Result<PlantingRecord, DocumentError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| DocumentError::InvalidJson(e.to_string()))?;
    normalize_field_document(&document)
}

/// First alias present with a non-null value
fn first_present<'a>(
    object: &'a Map<String, Value>,
    keys: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    keys.iter().find_map(|key| match object.get(*key) {
        Some(Value::Null) | None => None,
        Some(value) => Some((*key, value)),
    })
}

fn date_field(
    object: &Map<String, Value>,
    keys: &[&'static str],
) -> Result<Option<NaiveDate>, DocumentError> {
    match first_present(object, keys) {
        Some((key, value)) => parse_date_value(key, value),
        None => Ok(None),
    }
}

/// Reduce a date-like JSON value to its UTC calendar day
pub fn parse_date_value(field: &str, value: &Value) -> Result<Option<NaiveDate>, DocumentError> {
    let invalid = || DocumentError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    };

    match value {
        Value::Null => Ok(None),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                return Ok(Some(date));
            }
            DateTime::parse_from_rfc3339(text)
                .map(|timestamp| Some(timestamp.with_timezone(&Utc).date_naive()))
                .map_err(|_| invalid())
        }
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|timestamp| Some(timestamp.date_naive()))
            .ok_or_else(invalid),
        Value::Object(timestamp) => timestamp
            .get("seconds")
            .or_else(|| timestamp.get("_seconds"))
            .and_then(Value::as_i64)
            .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
            .map(|timestamp| Some(timestamp.date_naive()))
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn task_label(entry: &Value) -> Option<String> {
    let label = match entry {
        Value::String(label) => label.as_str(),
        Value::Object(task) => first_present(task, TASK_LABEL_KEYS)?.1.as_str()?,
        _ => return None,
    };
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}
