//! Derived growth status models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{FieldStatus, TaskRecommendation};

/// Categorical phase of cane development, derived solely from DAP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    NotPlanted,
    /// 0-44 DAP
    Germination,
    /// 45-99 DAP
    Tillering,
    /// 100-239 DAP
    GrandGrowth,
    /// 240-299 DAP
    Maturation,
    /// 300-329 DAP
    Ripening,
    /// 330+ DAP
    HarvestReady,
    Unknown,
}

impl GrowthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::NotPlanted => "not_planted",
            GrowthStage::Germination => "germination",
            GrowthStage::Tillering => "tillering",
            GrowthStage::GrandGrowth => "grand_growth",
            GrowthStage::Maturation => "maturation",
            GrowthStage::Ripening => "ripening",
            GrowthStage::HarvestReady => "harvest_ready",
            GrowthStage::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthStage::NotPlanted => write!(f, "Not Planted"),
            GrowthStage::Germination => write!(f, "Germination"),
            GrowthStage::Tillering => write!(f, "Tillering"),
            GrowthStage::GrandGrowth => write!(f, "Grand Growth"),
            GrowthStage::Maturation => write!(f, "Maturation"),
            GrowthStage::Ripening => write!(f, "Ripening"),
            GrowthStage::HarvestReady => write!(f, "Harvest Ready"),
            GrowthStage::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Which fertilization applications are missing past their deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayType {
    #[default]
    None,
    Basal,
    Main,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FertilizationDelay {
    pub is_delayed: bool,
    pub delay_days: i64,
    pub delay_type: DelayType,
}

impl FertilizationDelay {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HarvestOverdue {
    pub is_overdue: bool,
    pub overdue_days: i64,
}

/// Non-fatal conditions found while deriving a status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrowthWarning {
    UnknownVariety { variety: String, default_days: u32 },
}

/// Everything derived from a planting record at one instant.
/// Recomputed on demand, never treated as ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedGrowthStatus {
    pub as_of: NaiveDate,
    pub days_after_planting: Option<i64>,
    pub growth_stage: GrowthStage,
    pub expected_harvest_date: Option<NaiveDate>,
    pub days_remaining_to_harvest: Option<i64>,
    pub fertilization_delay: FertilizationDelay,
    pub harvest_overdue: HarvestOverdue,
    pub field_status: FieldStatus,
    pub recommendations: Vec<TaskRecommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<GrowthWarning>,
}
