//! Validation utilities for CaneMap field records
//!
//! The growth engine accepts any record; these checks belong to the input
//! layer that writes records in the first place.

use chrono::NaiveDate;

use crate::models::PlantingRecord;

pub const MAX_VARIETY_LABEL_LEN: usize = 64;
pub const MAX_TASK_LABEL_LEN: usize = 120;

// ============================================================================
// Field Record Validations
// ============================================================================

/// Planting cannot be recorded for a future day
pub fn validate_planting_date(planting_date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if planting_date > today {
        return Err("Planting date cannot be in the future");
    }
    Ok(())
}

/// Fertilization needs a planted field and cannot precede planting
pub fn validate_fertilization_date(
    planting_date: Option<NaiveDate>,
    fertilization_date: NaiveDate,
) -> Result<(), &'static str> {
    let planted = planting_date.ok_or("Field has not been planted yet")?;
    if fertilization_date < planted {
        return Err("Fertilization date cannot be before the planting date");
    }
    Ok(())
}

/// A task completion must fall between planting and today
pub fn validate_completion_date(
    planting_date: Option<NaiveDate>,
    completed_on: NaiveDate,
    today: NaiveDate,
) -> Result<(), &'static str> {
    if completed_on > today {
        return Err("Completion date cannot be in the future");
    }
    if let Some(planted) = planting_date {
        if completed_on < planted {
            return Err("Completion date cannot be before the planting date");
        }
    }
    Ok(())
}

pub fn validate_variety_label(label: &str) -> Result<(), &'static str> {
    let label = label.trim();
    if label.is_empty() {
        return Err("Variety is required");
    }
    if label.chars().count() > MAX_VARIETY_LABEL_LEN {
        return Err("Variety label is too long");
    }
    Ok(())
}

pub fn validate_task_label(label: &str) -> Result<(), &'static str> {
    let label = label.trim();
    if label.is_empty() {
        return Err("Task label is required");
    }
    if label.chars().count() > MAX_TASK_LABEL_LEN {
        return Err("Task label is too long");
    }
    Ok(())
}

/// Check every date in a record against planting and today
pub fn validate_planting_record(record: &PlantingRecord, today: NaiveDate) -> Result<(), &'static str> {
    if let Some(planted) = record.planting_date {
        validate_planting_date(planted, today)?;
        validate_variety_label(&record.variety)?;
    }
    if let Some(basal) = record.basal_fertilization_date {
        validate_fertilization_date(record.planting_date, basal)?;
    }
    if let Some(main) = record.main_fertilization_date {
        validate_fertilization_date(record.planting_date, main)?;
    }
    if let (Some(basal), Some(main)) = (
        record.basal_fertilization_date,
        record.main_fertilization_date,
    ) {
        if main < basal {
            return Err("Main fertilization cannot precede basal fertilization");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_validate_planting_date() {
        assert!(validate_planting_date(date("2024-01-01"), date("2024-01-01")).is_ok());
        assert!(validate_planting_date(date("2024-01-02"), date("2024-01-01")).is_err());
    }

    #[test]
    fn test_validate_fertilization_requires_planting() {
        assert_eq!(
            validate_fertilization_date(None, date("2024-01-10")),
            Err("Field has not been planted yet")
        );
        assert!(validate_fertilization_date(Some(date("2024-01-01")), date("2023-12-31")).is_err());
        assert!(validate_fertilization_date(Some(date("2024-01-01")), date("2024-01-01")).is_ok());
    }

    #[test]
    fn test_validate_completion_date() {
        let today = date("2024-06-01");
        assert!(validate_completion_date(None, today, today).is_ok());
        assert!(validate_completion_date(None, date("2024-06-02"), today).is_err());
        assert!(validate_completion_date(Some(date("2024-02-01")), date("2024-01-31"), today).is_err());
    }

    #[test]
    fn test_validate_variety_label() {
        assert!(validate_variety_label("PSR 07-195").is_ok());
        assert!(validate_variety_label("   ").is_err());
        assert!(validate_variety_label(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_planting_record() {
        let today = date("2024-06-01");
        let ok = PlantingRecord::planted(date("2024-01-01"), "PS 1")
            .with_basal_fertilization(date("2024-01-20"))
            .with_main_fertilization(date("2024-02-20"));
        assert!(validate_planting_record(&ok, today).is_ok());

        let swapped = PlantingRecord::planted(date("2024-01-01"), "PS 1")
            .with_basal_fertilization(date("2024-02-20"))
            .with_main_fertilization(date("2024-01-20"));
        assert!(validate_planting_record(&swapped, today).is_err());

        let unplanted_fertilized = PlantingRecord::default().with_basal_fertilization(date("2024-01-20"));
        assert!(validate_planting_record(&unplanted_fertilized, today).is_err());
    }
}
