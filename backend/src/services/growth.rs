//! Growth service: runs the growth engine over stored fields

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::{
    normalize_field_document, validate_completion_date, validate_fertilization_date,
    validate_planting_record, validate_variety_label, Clock, DerivedGrowthStatus,
    GrowthStageEngine, PlantingRecord, TaskRecommendation, VarietyTable,
};

use super::field::{
    CompleteTaskInput, CreateFieldInput, Field, FieldService, ImportFieldInput, TaskEffect,
    WriteBack,
};
use crate::error::{AppError, AppResult};

/// Growth service combining field storage with the growth engine
pub struct GrowthService<C> {
    fields: FieldService,
    engine: GrowthStageEngine<C>,
}

/// A field together with its freshly derived growth status
#[derive(Debug, Serialize)]
pub struct FieldGrowth {
    pub field: Field,
    pub harvested: bool,
    pub growth: DerivedGrowthStatus,
}

impl FieldGrowth {
    /// A harvested field has nothing left to recommend
    pub fn new(field: Field, mut growth: DerivedGrowthStatus) -> Self {
        let harvested = field.is_harvested();
        if harvested {
            growth.recommendations.clear();
        }
        Self {
            field,
            harvested,
            growth,
        }
    }
}

impl<C: Clock> GrowthService<C> {
    /// Create a new GrowthService instance
    pub fn new(db: PgPool, varieties: Arc<VarietyTable>, clock: C) -> Self {
        Self {
            fields: FieldService::new(db),
            engine: GrowthStageEngine::with_clock(varieties, clock),
        }
    }

    /// Create a field from typed input
    pub async fn create_field(&self, input: CreateFieldInput) -> AppResult<FieldGrowth> {
        input.validate()?;

        let mut record = PlantingRecord {
            planting_date: input.planting_date,
            variety: input.variety.unwrap_or_default().trim().to_string(),
            ..Default::default()
        };
        if record.planting_date.is_some() {
            record.completed_task_labels.insert("Planting".to_string());
        }

        self.insert(&input.name, record).await
    }

    /// Create a field from a loosely-typed document
    pub async fn import_field(&self, input: ImportFieldInput) -> AppResult<FieldGrowth> {
        input.validate()?;
        let record = normalize_field_document(&input.document)?;
        self.insert(&input.name, record).await
    }

    async fn insert(&self, name: &str, record: PlantingRecord) -> AppResult<FieldGrowth> {
        validate_planting_record(&record, self.engine.today())
            .map_err(|message| AppError::ValidationError(message.to_string()))?;

        let field = self.fields.insert_field(name, &record).await?;
        self.refresh(field).await
    }

    /// Derived status for a stored field
    pub async fn field_growth(&self, field_id: Uuid) -> AppResult<FieldGrowth> {
        let field = self.fields.get_field(field_id).await?;
        Ok(self.derive(field))
    }

    /// Recommended tasks for a stored field
    pub async fn recommendations(&self, field_id: Uuid) -> AppResult<Vec<TaskRecommendation>> {
        let field = self.fields.get_field(field_id).await?;
        if field.is_harvested() {
            return Ok(Vec::new());
        }
        Ok(self.engine.recommendations(&field.planting_record()))
    }

    /// Mark a task done, then recompute and write back the derived columns
    pub async fn complete_task(
        &self,
        field_id: Uuid,
        input: CompleteTaskInput,
    ) -> AppResult<FieldGrowth> {
        input.validate()?;

        let field = self.fields.get_field(field_id).await?;
        let today = self.engine.today();
        let completed_on = input.completed_on.unwrap_or(today);
        let effect = TaskEffect::for_label(&input.task);

        if field.is_harvested() {
            return Err(AppError::InvalidStateTransition(
                "Field has already been harvested".to_string(),
            ));
        }

        match effect {
            TaskEffect::Planting => {
                if field.planting_date.is_some() {
                    return Err(AppError::InvalidStateTransition(
                        "Field is already planted".to_string(),
                    ));
                }
                let variety = input.variety.as_deref().unwrap_or(&field.variety);
                validate_variety_label(variety).map_err(|m| AppError::invalid("variety", m))?;
                validate_completion_date(None, completed_on, today)
                    .map_err(|m| AppError::invalid("completed_on", m))?;
            }
            TaskEffect::BasalFertilization | TaskEffect::MainFertilization => {
                validate_fertilization_date(field.planting_date, completed_on)
                    .map_err(|m| AppError::invalid("completed_on", m))?;
                validate_completion_date(field.planting_date, completed_on, today)
                    .map_err(|m| AppError::invalid("completed_on", m))?;
            }
            TaskEffect::Harvest => {
                if field.planting_date.is_none() {
                    return Err(AppError::InvalidStateTransition(
                        "Cannot harvest a field that has not been planted".to_string(),
                    ));
                }
                validate_completion_date(field.planting_date, completed_on, today)
                    .map_err(|m| AppError::invalid("completed_on", m))?;
            }
            TaskEffect::LabelOnly => {
                validate_completion_date(field.planting_date, completed_on, today)
                    .map_err(|m| AppError::invalid("completed_on", m))?;
            }
        }

        let updated = self
            .fields
            .apply_task(&field, effect, &input.task, completed_on, input.variety.as_deref())
            .await?;
        self.refresh(updated).await
    }

    fn derive(&self, field: Field) -> FieldGrowth {
        let growth = self.engine.status(&field.planting_record());
        for warning in &growth.warnings {
            tracing::warn!(field_id = %field.id, ?warning, "Growth status computed with fallback");
        }
        FieldGrowth::new(field, growth)
    }

    /// Recompute derived values and persist them
    async fn refresh(&self, field: Field) -> AppResult<FieldGrowth> {
        let mut result = self.derive(field);
        let values = WriteBack::from_status(&result.growth, result.harvested);
        self.fields.write_back(result.field.id, &values).await?;

        result.field.growth_stage = values.growth_stage;
        result.field.delay_days = values.delay_days;
        result.field.status = values.status;
        Ok(result)
    }
}
