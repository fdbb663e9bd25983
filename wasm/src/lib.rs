//! WebAssembly module for CaneMap
//!
//! Provides client-side computation for the dashboards:
//! - Growth status and task recommendations for a field
//! - Normalization of field documents read from the document store
//! - Login lockout bookkeeping
//!
//! Values cross the boundary as JSON strings. "Now" is passed in as epoch
//! milliseconds; a non-positive value means "use the browser clock".

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;

use shared::{
    check_at, derive_status, growth_stage_for, normalize_field_json, record_failure_at,
    recommendations_for_harvest_days, FixedClock, LockoutPolicy, LoginAttempts, Clock,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    let table = VarietyTable::standard();
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "canemap-wasm ready, variety table {} ({} varieties)",
        table.version,
        table.len()
    )));
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization failed", e))
}

fn resolve_now(now_ms: f64) -> Result<DateTime<Utc>, JsValue> {
    let millis = if now_ms > 0.0 { now_ms } else { js_sys::Date::now() };
    FixedClock::from_millis(millis as i64)
        .map(|clock| clock.now())
        .ok_or_else(|| JsValue::from_str("Timestamp out of range"))
}

fn warn_in_console(warnings: &[GrowthWarning]) {
    for warning in warnings {
        let GrowthWarning::UnknownVariety {
            variety,
            default_days,
        } = warning;
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "Unknown sugarcane variety '{}', assuming {} days to harvest",
            variety, default_days
        )));
    }
}

/// Derived growth status for a field document
#[wasm_bindgen]
pub fn compute_growth_status(record_json: &str, now_ms: f64) -> Result<String, JsValue> {
    let record = normalize_field_json(record_json).map_err(|e| js_error("Invalid field", e))?;
    let today = resolve_now(now_ms)?.date_naive();

    let status = derive_status(&record, &VarietyTable::standard(), today);
    warn_in_console(&status.warnings);
    to_json(&status)
}

/// Display label of the growth stage at `dap`; negative means not planted
#[wasm_bindgen]
pub fn growth_stage_label(dap: i32) -> String {
    let dap = (dap >= 0).then_some(i64::from(dap));
    growth_stage_for(dap).to_string()
}

/// Recommendations for `dap` and `variety`, given a JSON array of completed labels
#[wasm_bindgen]
pub fn recommend_tasks(dap: i32, variety: &str, completed_json: &str) -> Result<String, JsValue> {
    let completed: Vec<String> = if completed_json.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(completed_json).map_err(|e| js_error("Invalid completed tasks", e))?
    };

    let table = VarietyTable::standard();
    let lookup = table.lookup(variety);
    if !lookup.known {
        warn_in_console(&[GrowthWarning::UnknownVariety {
            variety: variety.to_string(),
            default_days: lookup.harvest_days,
        }]);
    }

    let recommendations =
        recommendations_for_harvest_days(i64::from(dap), lookup.harvest_days, &completed);
    to_json(&recommendations)
}

/// Normalize a raw field document into a planting record
#[wasm_bindgen]
pub fn normalize_field_document(document_json: &str) -> Result<String, JsValue> {
    let record = normalize_field_json(document_json).map_err(|e| js_error("Invalid field", e))?;
    to_json(&record)
}

/// Expected harvest date (YYYY-MM-DD) for a planting date and variety
#[wasm_bindgen]
pub fn expected_harvest(planting_date: &str, variety: &str) -> Option<String> {
    let planted = chrono::NaiveDate::parse_from_str(planting_date, "%Y-%m-%d").ok()?;
    shared::expected_harvest_date(Some(planted), variety, &VarietyTable::standard())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn parse_attempts(record_json: &str) -> Result<LoginAttempts, JsValue> {
    if record_json.trim().is_empty() {
        return Ok(LoginAttempts::default());
    }
    serde_json::from_str(record_json).map_err(|e| js_error("Invalid login attempts", e))
}

/// Lockout decision for a stored attempts record
#[wasm_bindgen]
pub fn check_login_lockout(record_json: &str, now_ms: f64) -> Result<String, JsValue> {
    let record = parse_attempts(record_json)?;
    let decision = check_at(&LockoutPolicy::default(), &record, resolve_now(now_ms)?);
    to_json(&decision)
}

/// Updated attempts record after a failed sign-in
#[wasm_bindgen]
pub fn record_failed_login(record_json: &str, now_ms: f64) -> Result<String, JsValue> {
    let record = parse_attempts(record_json)?;
    let updated = record_failure_at(&LockoutPolicy::default(), &record, resolve_now(now_ms)?);
    to_json(&updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_stage_label() {
        assert_eq!(growth_stage_label(-1), "Not Planted");
        assert_eq!(growth_stage_label(0), "Germination");
        assert_eq!(growth_stage_label(150), "Grand Growth");
        assert_eq!(growth_stage_label(400), "Harvest Ready");
    }

    #[test]
    fn test_expected_harvest() {
        assert_eq!(
            expected_harvest("2024-01-01", "LCP 85-384"),
            Some("2024-12-31".to_string())
        );
        assert_eq!(expected_harvest("not a date", "LCP 85-384"), None);
    }

    #[test]
    fn test_normalize_field_document() {
        let json = normalize_field_document(r#"{"datePlanted":"2024-02-01","variety":"PS 1"}"#)
            .unwrap();
        let record: PlantingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.variety, "PS 1");
        assert!(record.is_planted());
    }

    #[test]
    fn test_compute_growth_status_with_explicit_now() {
        // 2024-02-20T00:00:00Z
        let json =
            compute_growth_status(r#"{"plantingDate":"2024-01-01","variety":"PS 1"}"#, 1_708_387_200_000.0)
                .unwrap();
        let status: DerivedGrowthStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status.days_after_planting, Some(50));
        assert_eq!(status.growth_stage, GrowthStage::Tillering);
        assert_eq!(status.field_status, FieldStatus::Delayed);
    }

    #[test]
    fn test_failed_login_round() {
        let json = record_failed_login("", 1_700_000_000_000.0).unwrap();
        let record: LoginAttempts = serde_json::from_str(&json).unwrap();
        assert_eq!(record.attempts, 1);
        let decision = check_login_lockout(&json, 1_700_000_000_000.0).unwrap();
        assert!(decision.contains("\"remaining_attempts\":4"));
    }
}
