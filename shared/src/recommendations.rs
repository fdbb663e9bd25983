//! Task recommendation rules
//!
//! Each rule owns a fixed DAP window and is evaluated independently, so a
//! field can get zero, one or several recommendations. Output follows rule
//! order (basal, main, weeding, harvest preparation, harvesting) and is
//! never re-sorted by urgency.
//!
//! Completed tasks are filtered out; labels resolve through
//! [`TaskType::from_label`], so aliases such as "Harvest" count. Fertilization
//! whose window has closed without being recorded is reported as
//! [`TaskCategory::Skipped`].

use std::collections::HashSet;

use crate::growth::growth_stage_for;
use crate::models::{TaskCategory, TaskRecommendation, TaskType, Urgency, VarietyTable};

const BASAL_WINDOW: (i64, i64) = (0, 30);
const MAIN_WINDOW: (i64, i64) = (40, 65);
const MAIN_CRITICAL: (i64, i64) = (45, 60);
const WEEDING_WINDOW: (i64, i64) = (30, 100);
const HARVEST_PREP_LEAD_DAYS: i64 = 45;
const HARVEST_LEAD_DAYS: i64 = 10;
const HARVEST_CRITICAL_SPREAD: i64 = 5;

/// Recommendations for `dap` using the variety's harvest days from `table`
pub fn generate_recommendations<I, S>(
    dap: i64,
    variety: &str,
    table: &VarietyTable,
    completed_task_labels: I,
) -> Vec<TaskRecommendation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    recommendations_for_harvest_days(dap, table.harvest_days(variety), completed_task_labels)
}

/// Recommendations for `dap` given the nominal harvest days directly
pub fn recommendations_for_harvest_days<I, S>(
    dap: i64,
    harvest_days: u32,
    completed_task_labels: I,
) -> Vec<TaskRecommendation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let dap = dap.max(0);
    let harvest_days = i64::from(harvest_days);
    let completed: HashSet<TaskType> = completed_task_labels
        .into_iter()
        .filter_map(|label| TaskType::from_label(label.as_ref()))
        .collect();
    let stage_label = growth_stage_for(Some(dap)).to_string();

    TaskType::ALL
        .into_iter()
        .filter(|task| !completed.contains(task))
        .filter_map(|task| match task {
            TaskType::BasalFertilization => basal_fertilization(dap),
            TaskType::MainFertilization => main_fertilization(dap),
            TaskType::Weeding => weeding(dap),
            TaskType::HarvestPreparation => harvest_preparation(dap, harvest_days),
            TaskType::Harvesting => harvesting(dap, harvest_days),
        })
        .map(|draft| draft.finish(&stage_label))
        .collect()
}

/// Where DAP sits relative to a window's closing day
enum Timing {
    Left(i64),
    Late(i64),
}

impl Timing {
    fn against(dap: i64, window_end: i64) -> Self {
        if dap <= window_end {
            Timing::Left(window_end - dap)
        } else {
            Timing::Late(dap - window_end)
        }
    }
}

struct Draft {
    task: TaskType,
    category: TaskCategory,
    urgency: Urgency,
    reason: String,
    timing: Timing,
}

impl Draft {
    fn finish(self, stage_label: &str) -> TaskRecommendation {
        let (days_left, days_late) = match self.timing {
            Timing::Left(days) => (Some(days), None),
            Timing::Late(days) => (None, Some(days)),
        };
        TaskRecommendation {
            task_label: self.task.label().to_string(),
            task_type: self.task,
            category: self.category,
            urgency: self.urgency,
            reason: self.reason,
            stage_label: stage_label.to_string(),
            days_left,
            days_late,
        }
    }
}

fn basal_fertilization(dap: i64) -> Option<Draft> {
    let (start, end) = BASAL_WINDOW;
    if dap < start {
        return None;
    }
    let draft = match Timing::against(dap, end) {
        Timing::Left(left) => Draft {
            task: TaskType::BasalFertilization,
            category: TaskCategory::Next,
            urgency: if dap > 25 { Urgency::High } else { Urgency::Medium },
            reason: format!("Apply basal fertilizer within {} days after planting", end),
            timing: Timing::Left(left),
        },
        Timing::Late(late) => Draft {
            task: TaskType::BasalFertilization,
            category: TaskCategory::Skipped,
            urgency: Urgency::Overdue,
            reason: format!("Basal fertilization window closed at {} DAP", end),
            timing: Timing::Late(late),
        },
    };
    Some(draft)
}

fn main_fertilization(dap: i64) -> Option<Draft> {
    let (start, end) = MAIN_WINDOW;
    if dap < start {
        return None;
    }
    let draft = match Timing::against(dap, end) {
        Timing::Left(left) => {
            let urgency = if (MAIN_CRITICAL.0..=MAIN_CRITICAL.1).contains(&dap) {
                Urgency::Critical
            } else if dap > MAIN_CRITICAL.1 {
                Urgency::Overdue
            } else {
                Urgency::Medium
            };
            Draft {
                task: TaskType::MainFertilization,
                category: TaskCategory::Next,
                urgency,
                reason: format!(
                    "Main fertilization is due between {} and {} DAP",
                    MAIN_CRITICAL.0, MAIN_CRITICAL.1
                ),
                timing: Timing::Left(left),
            }
        }
        Timing::Late(late) => Draft {
            task: TaskType::MainFertilization,
            category: TaskCategory::Skipped,
            urgency: Urgency::Overdue,
            reason: format!("Main fertilization window closed at {} DAP", end),
            timing: Timing::Late(late),
        },
    };
    Some(draft)
}

fn weeding(dap: i64) -> Option<Draft> {
    let (start, end) = WEEDING_WINDOW;
    if !(start..=end).contains(&dap) {
        return None;
    }
    Some(Draft {
        task: TaskType::Weeding,
        category: TaskCategory::Optional,
        urgency: Urgency::Medium,
        reason: "Keep rows clear of weeds until canopy closes".to_string(),
        timing: Timing::Left(end - dap),
    })
}

fn harvest_preparation(dap: i64, harvest_days: i64) -> Option<Draft> {
    let start = harvest_days - HARVEST_PREP_LEAD_DAYS;
    if !(start..harvest_days).contains(&dap) {
        return None;
    }
    Some(Draft {
        task: TaskType::HarvestPreparation,
        category: TaskCategory::Next,
        urgency: Urgency::High,
        reason: format!(
            "Arrange cutters and hauling before expected harvest at {} DAP",
            harvest_days
        ),
        timing: Timing::Left(harvest_days - dap),
    })
}

fn harvesting(dap: i64, harvest_days: i64) -> Option<Draft> {
    if dap < harvest_days - HARVEST_LEAD_DAYS {
        return None;
    }
    let end = harvest_days + HARVEST_LEAD_DAYS;
    let urgency = if (dap - harvest_days).abs() <= HARVEST_CRITICAL_SPREAD {
        Urgency::Critical
    } else if dap > end {
        Urgency::Overdue
    } else {
        Urgency::High
    };
    let reason = if dap > end {
        format!("Harvest is past the {} DAP window", end)
    } else {
        format!("Cane reaches harvest age at {} DAP", harvest_days)
    };
    Some(Draft {
        task: TaskType::Harvesting,
        category: TaskCategory::Next,
        urgency,
        reason,
        timing: Timing::against(dap, end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    fn types(recs: &[TaskRecommendation]) -> Vec<TaskType> {
        recs.iter().map(|r| r.task_type).collect()
    }

    #[test]
    fn test_planting_day_suggests_basal_only() {
        let recs = recommendations_for_harvest_days(0, 365, NONE);
        assert_eq!(types(&recs), vec![TaskType::BasalFertilization]);
        assert_eq!(recs[0].urgency, Urgency::Medium);
        assert_eq!(recs[0].days_left, Some(30));
        assert_eq!(recs[0].stage_label, "Germination");
    }

    #[test]
    fn test_basal_urgency_rises_after_day_25() {
        let recs = recommendations_for_harvest_days(26, 365, NONE);
        assert_eq!(recs[0].urgency, Urgency::High);
        assert_eq!(recs[0].days_left, Some(4));
    }

    #[test]
    fn test_main_fertilization_urgency_bands() {
        let urgency_at = |dap| {
            recommendations_for_harvest_days(dap, 365, NONE)
                .into_iter()
                .find(|r| r.task_type == TaskType::MainFertilization)
                .map(|r| r.urgency)
        };
        assert_eq!(urgency_at(39), None);
        assert_eq!(urgency_at(42), Some(Urgency::Medium));
        assert_eq!(urgency_at(45), Some(Urgency::Critical));
        assert_eq!(urgency_at(60), Some(Urgency::Critical));
        assert_eq!(urgency_at(63), Some(Urgency::Overdue));
    }

    #[test]
    fn test_missed_fertilization_is_skipped_with_days_late() {
        let recs = recommendations_for_harvest_days(70, 365, NONE);
        let basal = &recs[0];
        assert_eq!(basal.category, TaskCategory::Skipped);
        assert_eq!(basal.days_late, Some(40));
        assert_eq!(basal.days_left, None);
        let main = &recs[1];
        assert_eq!(main.task_type, TaskType::MainFertilization);
        assert_eq!(main.category, TaskCategory::Skipped);
        assert_eq!(main.days_late, Some(5));
    }

    #[test]
    fn test_weeding_is_optional() {
        let recs = recommendations_for_harvest_days(80, 365, ["basal fertilization", "Main Fertilization"]);
        assert_eq!(types(&recs), vec![TaskType::Weeding]);
        assert_eq!(recs[0].category, TaskCategory::Optional);
        assert_eq!(recs[0].days_left, Some(20));
    }

    #[test]
    fn test_completed_labels_are_normalized() {
        let recs = recommendations_for_harvest_days(10, 365, ["  BASAL_fertilization "]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_harvest_alias_counts_as_harvesting() {
        let recs = recommendations_for_harvest_days(362, 365, ["Harvest"]);
        assert!(!types(&recs).contains(&TaskType::Harvesting));
    }

    #[test]
    fn test_harvest_window_around_maturity() {
        let done = ["basal_fertilization", "main_fertilization"];
        let recs = recommendations_for_harvest_days(362, 365, done);
        assert_eq!(
            types(&recs),
            vec![TaskType::HarvestPreparation, TaskType::Harvesting]
        );
        let harvest = &recs[1];
        assert_eq!(harvest.urgency, Urgency::Critical);
        assert_eq!(harvest.days_left, Some(13));
        assert_eq!(harvest.days_late, None);
    }

    #[test]
    fn test_harvesting_urgency_bands() {
        let harvest_at = |dap| {
            recommendations_for_harvest_days(dap, 365, NONE)
                .into_iter()
                .find(|r| r.task_type == TaskType::Harvesting)
        };
        assert!(harvest_at(354).is_none());
        assert_eq!(harvest_at(355).unwrap().urgency, Urgency::High);
        assert_eq!(harvest_at(360).unwrap().urgency, Urgency::Critical);
        assert_eq!(harvest_at(370).unwrap().urgency, Urgency::Critical);
        assert_eq!(harvest_at(372).unwrap().urgency, Urgency::High);
        let late = harvest_at(380).unwrap();
        assert_eq!(late.urgency, Urgency::Overdue);
        assert_eq!(late.days_late, Some(5));
        assert_eq!(late.category, TaskCategory::Next);
    }

    #[test]
    fn test_generate_uses_variety_table() {
        let table = VarietyTable::standard();
        let recs = generate_recommendations(340, "PSR 07-195", &table, NONE);
        let harvest = recs
            .iter()
            .find(|r| r.task_type == TaskType::Harvesting)
            .unwrap();
        assert_eq!(harvest.urgency, Urgency::Critical);
    }
}
