//! Field persistence: the store behind the growth engine
//!
//! Fields are read into [`PlantingRecord`]s and derived values are written
//! back column by column. Writes rely on PostgreSQL's per-row semantics;
//! concurrent task completions on the same field are last-writer-wins.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::{normalize_task_label, DerivedGrowthStatus, PlantingRecord, TaskType};

use crate::error::{AppError, AppResult};

/// Stage and status stored once a harvest has been recorded
pub const HARVESTED: &str = "harvested";

/// Field service for reading and updating planted fields
#[derive(Clone)]
pub struct FieldService {
    db: PgPool,
}

/// Field information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Field {
    pub id: Uuid,
    pub name: String,
    pub variety: String,
    pub planting_date: Option<NaiveDate>,
    pub basal_fertilization_date: Option<NaiveDate>,
    pub main_fertilization_date: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
    pub completed_tasks: Vec<String>,
    pub growth_stage: String,
    pub delay_days: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Field {
    /// The engine's view of this field
    pub fn planting_record(&self) -> PlantingRecord {
        let mut record = PlantingRecord {
            planting_date: self.planting_date,
            variety: self.variety.clone(),
            basal_fertilization_date: self.basal_fertilization_date,
            main_fertilization_date: self.main_fertilization_date,
            completed_task_labels: self.completed_tasks.iter().cloned().collect(),
        };
        if self.is_harvested() {
            record
                .completed_task_labels
                .insert(TaskType::Harvesting.label().to_string());
        }
        record
    }

    pub fn is_harvested(&self) -> bool {
        self.harvest_date.is_some()
    }
}

/// Input for creating a field
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFieldInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 64))]
    pub variety: Option<String>,
    pub planting_date: Option<NaiveDate>,
}

/// Input for importing a field from a raw document
#[derive(Debug, Deserialize, Validate)]
pub struct ImportFieldInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub document: serde_json::Value,
}

/// Input for marking a task done
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteTaskInput {
    #[validate(length(min = 1, max = 120))]
    pub task: String,
    /// Defaults to today
    pub completed_on: Option<NaiveDate>,
    /// Required when planting a field that has no variety yet
    #[validate(length(max = 64))]
    pub variety: Option<String>,
}

/// What a completed task changes on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEffect {
    Planting,
    BasalFertilization,
    MainFertilization,
    Harvest,
    /// Only recorded as a completed label
    LabelOnly,
}

impl TaskEffect {
    pub fn for_label(label: &str) -> Self {
        match normalize_task_label(label).as_str() {
            "planting" | "plant" | "plant cane" => return TaskEffect::Planting,
            "harvest" => return TaskEffect::Harvest,
            _ => {}
        }
        match TaskType::from_label(label) {
            Some(TaskType::BasalFertilization) => TaskEffect::BasalFertilization,
            Some(TaskType::MainFertilization) => TaskEffect::MainFertilization,
            Some(TaskType::Harvesting) => TaskEffect::Harvest,
            _ => TaskEffect::LabelOnly,
        }
    }
}

/// Known tasks are stored under their display label, e.g. `"harvest"` as
/// `"Harvesting"`; anything else is kept as typed, trimmed.
pub fn canonical_task_label(label: &str) -> String {
    match TaskType::from_label(label) {
        Some(task) => task.label().to_string(),
        None => label.trim().to_string(),
    }
}

/// Derived columns written back after every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBack {
    pub growth_stage: String,
    pub delay_days: i64,
    pub status: String,
}

impl WriteBack {
    pub fn from_status(derived: &DerivedGrowthStatus, harvested: bool) -> Self {
        if harvested {
            return Self {
                growth_stage: HARVESTED.to_string(),
                delay_days: 0,
                status: HARVESTED.to_string(),
            };
        }
        Self {
            growth_stage: derived.growth_stage.as_str().to_string(),
            delay_days: derived.fertilization_delay.delay_days,
            status: derived.field_status.as_str().to_string(),
        }
    }
}

const FIELD_COLUMNS: &str = "id, name, variety, planting_date, basal_fertilization_date, \
     main_fertilization_date, harvest_date, completed_tasks, growth_stage, delay_days, \
     status, created_at, updated_at";

impl FieldService {
    /// Create a new FieldService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all fields
    pub async fn list_fields(&self) -> AppResult<Vec<Field>> {
        let fields = sqlx::query_as::<_, Field>(&format!(
            "SELECT {} FROM fields ORDER BY name ASC",
            FIELD_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(fields)
    }

    /// Get a field by ID
    pub async fn get_field(&self, field_id: Uuid) -> AppResult<Field> {
        sqlx::query_as::<_, Field>(&format!("SELECT {} FROM fields WHERE id = $1", FIELD_COLUMNS))
            .bind(field_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Field".to_string()))
    }

    /// Insert a field from a normalized record
    pub async fn insert_field(&self, name: &str, record: &PlantingRecord) -> AppResult<Field> {
        let completed: Vec<String> = record.completed_task_labels.iter().cloned().collect();

        let field = sqlx::query_as::<_, Field>(&format!(
            r#"
            INSERT INTO fields (id, name, variety, planting_date, basal_fertilization_date,
                                main_fertilization_date, completed_tasks)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FIELD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(name.trim())
        .bind(&record.variety)
        .bind(record.planting_date)
        .bind(record.basal_fertilization_date)
        .bind(record.main_fertilization_date)
        .bind(&completed)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(field_id = %field.id, name = %field.name, "Field created");
        Ok(field)
    }

    /// Record a completed task and the date column it implies
    pub async fn apply_task(
        &self,
        field: &Field,
        effect: TaskEffect,
        label: &str,
        completed_on: NaiveDate,
        variety: Option<&str>,
    ) -> AppResult<Field> {
        let mut planting_date = field.planting_date;
        let mut basal = field.basal_fertilization_date;
        let mut main = field.main_fertilization_date;
        let mut harvest = field.harvest_date;
        let mut field_variety = field.variety.clone();

        match effect {
            TaskEffect::Planting => {
                planting_date = Some(completed_on);
                if let Some(variety) = variety {
                    field_variety = variety.trim().to_string();
                }
            }
            TaskEffect::BasalFertilization => basal = Some(completed_on),
            TaskEffect::MainFertilization => main = Some(completed_on),
            TaskEffect::Harvest => harvest = Some(completed_on),
            TaskEffect::LabelOnly => {}
        }

        let label = canonical_task_label(label);
        let label = label.as_str();
        let mut completed = field.completed_tasks.clone();
        if !completed
            .iter()
            .any(|done| normalize_task_label(done) == normalize_task_label(label))
        {
            completed.push(label.to_string());
        }

        let updated = sqlx::query_as::<_, Field>(&format!(
            r#"
            UPDATE fields
            SET variety = $1, planting_date = $2, basal_fertilization_date = $3,
                main_fertilization_date = $4, harvest_date = $5, completed_tasks = $6,
                updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            FIELD_COLUMNS
        ))
        .bind(&field_variety)
        .bind(planting_date)
        .bind(basal)
        .bind(main)
        .bind(harvest)
        .bind(&completed)
        .bind(field.id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Field".to_string()))?;

        tracing::info!(
            field_id = %field.id,
            task = %label,
            effect = ?effect,
            %completed_on,
            "Task completed"
        );
        Ok(updated)
    }

    /// Partial update of the derived columns
    pub async fn write_back(&self, field_id: Uuid, values: &WriteBack) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE fields
            SET growth_stage = $1, delay_days = $2, status = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&values.growth_stage)
        .bind(values.delay_days)
        .bind(&values.status)
        .bind(field_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Field".to_string()));
        }

        tracing::debug!(
            %field_id,
            growth_stage = %values.growth_stage,
            status = %values.status,
            delay_days = values.delay_days,
            "Derived status written back"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{derive_status, VarietyTable};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_task_effect_from_label() {
        assert_eq!(TaskEffect::for_label("Planting"), TaskEffect::Planting);
        assert_eq!(TaskEffect::for_label("basal_fertilization"), TaskEffect::BasalFertilization);
        assert_eq!(TaskEffect::for_label("Main  Fertilization"), TaskEffect::MainFertilization);
        assert_eq!(TaskEffect::for_label("Harvesting"), TaskEffect::Harvest);
        assert_eq!(TaskEffect::for_label("harvest"), TaskEffect::Harvest);
        assert_eq!(TaskEffect::for_label("Weeding"), TaskEffect::LabelOnly);
        assert_eq!(TaskEffect::for_label("Irrigation"), TaskEffect::LabelOnly);
    }

    #[test]
    fn test_write_back_from_derived_status() {
        let record = PlantingRecord::planted(date("2024-01-01"), "PS 1");
        let derived = derive_status(&record, &VarietyTable::standard(), date("2024-03-11"));
        let values = WriteBack::from_status(&derived, false);
        assert_eq!(values.growth_stage, "tillering");
        assert_eq!(values.delay_days, 40);
        assert_eq!(values.status, "delayed");
    }

    #[test]
    fn test_write_back_after_harvest() {
        let record = PlantingRecord::planted(date("2023-01-01"), "PS 1");
        let derived = derive_status(&record, &VarietyTable::standard(), date("2024-03-01"));
        let values = WriteBack::from_status(&derived, true);
        assert_eq!(values.growth_stage, HARVESTED);
        assert_eq!(values.status, HARVESTED);
        assert_eq!(values.delay_days, 0);
    }

    fn harvested_field() -> Field {
        let now = Utc::now();
        Field {
            id: Uuid::new_v4(),
            name: "North block".to_string(),
            variety: "PS 1".to_string(),
            planting_date: Some(date("2024-01-01")),
            basal_fertilization_date: None,
            main_fertilization_date: None,
            harvest_date: Some(date("2025-01-02")),
            completed_tasks: vec!["Planting".to_string()],
            growth_stage: HARVESTED.to_string(),
            delay_days: 0,
            status: HARVESTED.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_canonical_task_label() {
        assert_eq!(canonical_task_label(" harvest "), "Harvesting");
        assert_eq!(canonical_task_label("basal_fertilization"), "Basal Fertilization");
        assert_eq!(canonical_task_label("  Irrigation "), "Irrigation");
    }

    #[test]
    fn test_harvest_date_marks_record_harvested() {
        let record = harvested_field().planting_record();
        assert!(record.is_harvested());
        let derived = derive_status(&record, &VarietyTable::standard(), date("2025-01-05"));
        assert!(derived.recommendations.is_empty());
    }

    #[test]
    fn test_create_input_validation() {
        let input = CreateFieldInput {
            name: String::new(),
            variety: Some("PS 1".to_string()),
            planting_date: None,
        };
        assert!(input.validate().is_err());
    }
}
