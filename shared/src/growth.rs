//! Growth stage engine
//!
//! Pure calculations over a [`PlantingRecord`]: days after planting (DAP),
//! growth stage, expected harvest, fertilization delay, harvest overdue and
//! overall field status.
//!
//! All dates are UTC calendar days. "Now" enters either as an explicit
//! `as_of` date or through a [`Clock`] read once per call, so every value in
//! a [`DerivedGrowthStatus`] refers to the same instant.

use std::sync::Arc;

use chrono::{Days, NaiveDate};

use crate::clock::{Clock, SystemClock};
use crate::models::{
    DelayType, DerivedGrowthStatus, FertilizationDelay, FieldStatus, GrowthStage, GrowthWarning,
    HarvestOverdue, PlantingRecord, TaskRecommendation, TaskType, VarietyTable,
};
use crate::recommendations::recommendations_for_harvest_days;

/// Basal fertilizer must be applied by this DAP
pub const BASAL_FERTILIZATION_DEADLINE_DAP: i64 = 30;

/// Main fertilizer must be applied by this DAP
pub const MAIN_FERTILIZATION_DEADLINE_DAP: i64 = 60;

/// Days after the expected harvest date before a field counts as overdue
pub const HARVEST_GRACE_DAYS: u64 = 30;

/// Whole days since planting, clamped at zero for future-dated plantings.
/// `None` means the field is not planted yet, which is not the same as DAP 0.
pub fn compute_dap(planting_date: Option<NaiveDate>, as_of: NaiveDate) -> Option<i64> {
    planting_date.map(|planted| (as_of - planted).num_days().max(0))
}

/// Map DAP to a growth stage. Lower bounds inclusive, upper bounds exclusive.
pub fn growth_stage_for(dap: Option<i64>) -> GrowthStage {
    match dap {
        None => GrowthStage::NotPlanted,
        Some(0..=44) => GrowthStage::Germination,
        Some(45..=99) => GrowthStage::Tillering,
        Some(100..=239) => GrowthStage::GrandGrowth,
        Some(240..=299) => GrowthStage::Maturation,
        Some(300..=329) => GrowthStage::Ripening,
        Some(330..) => GrowthStage::HarvestReady,
        Some(_) => GrowthStage::Unknown,
    }
}

/// Planting date plus the variety's nominal harvest days
pub fn expected_harvest_date(
    planting_date: Option<NaiveDate>,
    variety: &str,
    table: &VarietyTable,
) -> Option<NaiveDate> {
    let planted = planting_date?;
    add_days(planted, table.harvest_days(variety))
}

/// Signed days until the expected harvest; negative once it has passed
pub fn days_remaining(expected_harvest_date: Option<NaiveDate>, as_of: NaiveDate) -> Option<i64> {
    expected_harvest_date.map(|expected| (expected - as_of).num_days())
}

/// Evaluate missing fertilization against elapsed time.
///
/// Only absent dates count. A recorded date stops further delay growth
/// for that application; callers overwrite any stored delay afterwards.
pub fn check_fertilization_delay(
    planting_date: Option<NaiveDate>,
    basal_date: Option<NaiveDate>,
    main_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> FertilizationDelay {
    let Some(dap) = compute_dap(planting_date, as_of) else {
        return FertilizationDelay::none();
    };

    let basal_delay = (basal_date.is_none() && dap > BASAL_FERTILIZATION_DEADLINE_DAP)
        .then(|| dap - BASAL_FERTILIZATION_DEADLINE_DAP);
    let main_delay = (main_date.is_none() && dap > MAIN_FERTILIZATION_DEADLINE_DAP)
        .then(|| dap - MAIN_FERTILIZATION_DEADLINE_DAP);

    let (delay_days, delay_type) = match (basal_delay, main_delay) {
        (Some(basal), Some(main)) => (basal.max(main), DelayType::Both),
        (Some(basal), None) => (basal, DelayType::Basal),
        (None, Some(main)) => (main, DelayType::Main),
        (None, None) => return FertilizationDelay::none(),
    };

    FertilizationDelay {
        is_delayed: true,
        delay_days,
        delay_type,
    }
}

/// Overdue once `as_of` is past the expected harvest plus the grace period.
/// The grace period is the same for every variety.
pub fn check_harvest_overdue(
    expected_harvest_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> HarvestOverdue {
    let Some(max_harvest_date) =
        expected_harvest_date.and_then(|expected| expected.checked_add_days(Days::new(HARVEST_GRACE_DAYS)))
    else {
        return HarvestOverdue::default();
    };

    if as_of > max_harvest_date {
        HarvestOverdue {
            is_overdue: true,
            overdue_days: (as_of - max_harvest_date).num_days(),
        }
    } else {
        HarvestOverdue::default()
    }
}

/// Overall status; an overdue harvest outranks a fertilization delay
pub fn field_status(record: &PlantingRecord, table: &VarietyTable, as_of: NaiveDate) -> FieldStatus {
    let expected = expected_harvest_date(record.planting_date, &record.variety, table);
    resolve_field_status(record, expected, as_of)
}

fn resolve_field_status(
    record: &PlantingRecord,
    expected_harvest: Option<NaiveDate>,
    as_of: NaiveDate,
) -> FieldStatus {
    if record.planting_date.is_none() {
        return FieldStatus::NotPlanted;
    }
    if check_harvest_overdue(expected_harvest, as_of).is_overdue {
        return FieldStatus::Overdue;
    }
    let delay = check_fertilization_delay(
        record.planting_date,
        record.basal_fertilization_date,
        record.main_fertilization_date,
        as_of,
    );
    if delay.is_delayed {
        FieldStatus::Delayed
    } else {
        FieldStatus::Active
    }
}

/// Compute every derived value for `record` as of one day.
///
/// The variety is resolved once; an unknown variety is reported in
/// `warnings` rather than failing. A recorded fertilization date counts as
/// a completed task when building recommendations, and a recorded harvest
/// leaves nothing to recommend.
pub fn derive_status(
    record: &PlantingRecord,
    table: &VarietyTable,
    as_of: NaiveDate,
) -> DerivedGrowthStatus {
    let dap = compute_dap(record.planting_date, as_of);
    let growth_stage = growth_stage_for(dap);

    let mut warnings = Vec::new();
    let (expected_harvest_date, mut recommendations) = match record.planting_date {
        Some(planted) => {
            let lookup = table.lookup(&record.variety);
            if !lookup.known {
                warnings.push(GrowthWarning::UnknownVariety {
                    variety: record.variety.clone(),
                    default_days: lookup.harvest_days,
                });
            }
            let completed = completed_labels(record);
            let recommendations = recommendations_for_harvest_days(
                dap.unwrap_or_default(),
                lookup.harvest_days,
                &completed,
            );
            (add_days(planted, lookup.harvest_days), recommendations)
        }
        None => (None, Vec::new()),
    };
    if record.is_harvested() {
        recommendations.clear();
    }

    DerivedGrowthStatus {
        as_of,
        days_after_planting: dap,
        growth_stage,
        expected_harvest_date,
        days_remaining_to_harvest: days_remaining(expected_harvest_date, as_of),
        fertilization_delay: check_fertilization_delay(
            record.planting_date,
            record.basal_fertilization_date,
            record.main_fertilization_date,
            as_of,
        ),
        harvest_overdue: check_harvest_overdue(expected_harvest_date, as_of),
        field_status: resolve_field_status(record, expected_harvest_date, as_of),
        recommendations,
        warnings,
    }
}

fn completed_labels(record: &PlantingRecord) -> Vec<String> {
    let mut labels: Vec<String> = record.completed_task_labels.iter().cloned().collect();
    if record.basal_fertilization_date.is_some() {
        labels.push(TaskType::BasalFertilization.as_str().to_string());
    }
    if record.main_fertilization_date.is_some() {
        labels.push(TaskType::MainFertilization.as_str().to_string());
    }
    labels
}

fn add_days(date: NaiveDate, days: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
}

/// The growth engine bound to a variety table and a clock
#[derive(Debug, Clone)]
pub struct GrowthStageEngine<C = SystemClock> {
    table: Arc<VarietyTable>,
    clock: C,
}

impl GrowthStageEngine<SystemClock> {
    pub fn new(table: impl Into<Arc<VarietyTable>>) -> Self {
        Self::with_clock(table, SystemClock)
    }
}

impl Default for GrowthStageEngine<SystemClock> {
    fn default() -> Self {
        Self::new(VarietyTable::standard())
    }
}

impl<C: Clock> GrowthStageEngine<C> {
    pub fn with_clock(table: impl Into<Arc<VarietyTable>>, clock: C) -> Self {
        Self {
            table: table.into(),
            clock,
        }
    }

    pub fn table(&self) -> &VarietyTable {
        &self.table
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn dap(&self, record: &PlantingRecord) -> Option<i64> {
        compute_dap(record.planting_date, self.today())
    }

    pub fn status(&self, record: &PlantingRecord) -> DerivedGrowthStatus {
        derive_status(record, &self.table, self.today())
    }

    pub fn field_status(&self, record: &PlantingRecord) -> FieldStatus {
        field_status(record, &self.table, self.today())
    }

    /// Recommendations only; empty when the field is not planted
    pub fn recommendations(&self, record: &PlantingRecord) -> Vec<TaskRecommendation> {
        self.status(record).recommendations
    }
}
