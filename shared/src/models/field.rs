//! Planted field models

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{normalize_task_label, SugarcaneVariety, TaskType};

/// The inputs the growth engine needs from a field.
///
/// Created when a planting task is completed; later task completions
/// fill in the fertilization dates and completed labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantingRecord {
    pub planting_date: Option<NaiveDate>,
    #[serde(default)]
    pub variety: String,
    pub basal_fertilization_date: Option<NaiveDate>,
    pub main_fertilization_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_task_labels: BTreeSet<String>,
}

impl PlantingRecord {
    pub fn planted(planting_date: NaiveDate, variety: impl Into<String>) -> Self {
        Self {
            planting_date: Some(planting_date),
            variety: variety.into(),
            ..Default::default()
        }
    }

    pub fn with_basal_fertilization(mut self, date: NaiveDate) -> Self {
        self.basal_fertilization_date = Some(date);
        self
    }

    pub fn with_main_fertilization(mut self, date: NaiveDate) -> Self {
        self.main_fertilization_date = Some(date);
        self
    }

    pub fn with_completed_task(mut self, label: impl Into<String>) -> Self {
        self.completed_task_labels.insert(label.into());
        self
    }

    pub fn is_planted(&self) -> bool {
        self.planting_date.is_some()
    }

    pub fn sugarcane_variety(&self) -> SugarcaneVariety {
        SugarcaneVariety::parse(&self.variety)
    }

    /// Whether a label matching `label` (after normalization) was recorded as done
    pub fn has_completed(&self, label: &str) -> bool {
        let wanted = normalize_task_label(label);
        self.completed_task_labels
            .iter()
            .any(|done| normalize_task_label(done) == wanted)
    }

    /// Whether any recorded label, aliases included, resolves to `task`
    pub fn has_completed_task(&self, task: TaskType) -> bool {
        self.completed_task_labels
            .iter()
            .any(|done| TaskType::from_label(done) == Some(task))
    }

    /// A recorded harvest closes the crop cycle
    pub fn is_harvested(&self) -> bool {
        self.has_completed_task(TaskType::Harvesting)
    }
}

/// Overall field condition, first match wins:
/// not planted, harvest overdue, fertilization delayed, active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    NotPlanted,
    Overdue,
    Delayed,
    Active,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::NotPlanted => "not_planted",
            FieldStatus::Overdue => "overdue",
            FieldStatus::Delayed => "delayed",
            FieldStatus::Active => "active",
        }
    }
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldStatus::NotPlanted => write!(f, "Not Planted"),
            FieldStatus::Overdue => write!(f, "Harvest Overdue"),
            FieldStatus::Delayed => write!(f, "Fertilization Delayed"),
            FieldStatus::Active => write!(f, "Active"),
        }
    }
}
