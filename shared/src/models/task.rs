//! Task recommendation models

use serde::{Deserialize, Serialize};

/// Field operations the recommendation rules know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    BasalFertilization,
    MainFertilization,
    Weeding,
    HarvestPreparation,
    Harvesting,
}

impl TaskType {
    /// Rule-table order, which is also the output order of recommendations
    pub const ALL: [TaskType; 5] = [
        TaskType::BasalFertilization,
        TaskType::MainFertilization,
        TaskType::Weeding,
        TaskType::HarvestPreparation,
        TaskType::Harvesting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::BasalFertilization => "basal_fertilization",
            TaskType::MainFertilization => "main_fertilization",
            TaskType::Weeding => "weeding",
            TaskType::HarvestPreparation => "harvest_preparation",
            TaskType::Harvesting => "harvesting",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::BasalFertilization => "Basal Fertilization",
            TaskType::MainFertilization => "Main Fertilization",
            TaskType::Weeding => "Weeding",
            TaskType::HarvestPreparation => "Harvest Preparation",
            TaskType::Harvesting => "Harvesting",
        }
    }

    /// Other names farmers record for the same task
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            TaskType::BasalFertilization => &["basal", "basal fertilizer"],
            TaskType::MainFertilization => &["main fertilizer", "top dressing"],
            TaskType::Weeding => &["weed control"],
            TaskType::HarvestPreparation => &["harvest prep"],
            TaskType::Harvesting => &["harvest", "harvested", "cutting"],
        }
    }

    /// Resolve a free-text task label, e.g. `"Main  fertilization"` or `"Harvest"`
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = normalize_task_label(label);
        Self::ALL.into_iter().find(|task| {
            normalize_task_label(task.as_str()) == normalized
                || normalize_task_label(task.label()) == normalized
                || task.aliases().iter().any(|alias| *alias == normalized)
        })
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How a recommendation relates to the task's window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Actionable now
    Next,
    /// Window closed without the task being recorded
    Skipped,
    /// Discretionary maintenance
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    Overdue,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Critical => write!(f, "critical"),
            Urgency::Overdue => write!(f, "overdue"),
            Urgency::High => write!(f, "high"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::Low => write!(f, "low"),
        }
    }
}

/// A recommended field operation for the current DAP.
///
/// Exactly one of `days_left` and `days_late` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecommendation {
    pub task_label: String,
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub urgency: Urgency,
    pub reason: String,
    pub stage_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_late: Option<i64>,
}

/// Normalize a task label for comparison: lowercase, with runs of
/// whitespace, `_` and `-` collapsed to a single space.
pub fn normalize_task_label(label: &str) -> String {
    label
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_task_label() {
        assert_eq!(normalize_task_label("  Basal   Fertilization "), "basal fertilization");
        assert_eq!(normalize_task_label("basal_fertilization"), "basal fertilization");
        assert_eq!(normalize_task_label("HARVEST-preparation"), "harvest preparation");
        assert_eq!(normalize_task_label(""), "");
    }

    #[test]
    fn test_task_type_from_label() {
        assert_eq!(TaskType::from_label("Weeding"), Some(TaskType::Weeding));
        assert_eq!(
            TaskType::from_label("main_fertilization"),
            Some(TaskType::MainFertilization)
        );
        assert_eq!(TaskType::from_label("Irrigation"), None);
    }

    #[test]
    fn test_task_type_aliases() {
        assert_eq!(TaskType::from_label("Harvest"), Some(TaskType::Harvesting));
        assert_eq!(TaskType::from_label("  harvested"), Some(TaskType::Harvesting));
        assert_eq!(TaskType::from_label("Top-Dressing"), Some(TaskType::MainFertilization));
        assert_eq!(TaskType::from_label("harvest prep"), Some(TaskType::HarvestPreparation));
    }

    #[test]
    fn test_urgency_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Urgency::Critical).unwrap(), "\"critical\"");
    }
}
