//! Growth stage engine property-based and unit tests
//!
//! Covers:
//! - DAP is zero on the planting day and never negative
//! - Growth stages partition every DAP without gaps
//! - Expected harvest follows the variety table
//! - Fertilization delay and harvest overdue rules
//! - Field status priority

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use shared::{
    check_fertilization_delay, check_harvest_overdue, compute_dap, derive_status,
    expected_harvest_date, field_status, growth_stage_for, DelayType, FieldStatus, FixedClock,
    GrowthStage, GrowthStageEngine, PlantingRecord, SugarcaneVariety, VarietyTable,
    DEFAULT_HARVEST_DAYS,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn plus_days(start: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        start.checked_add_days(Days::new(days as u64)).unwrap()
    } else {
        start.checked_sub_days(Days::new(days.unsigned_abs())).unwrap()
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Dates between 2000 and roughly 2050
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..18_000).prop_map(|offset| plus_days(date("2000-01-01"), offset))
}

/// Planting date with a reference day up to three years either side
fn planting_and_as_of_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (date_strategy(), -1_100i64..1_100).prop_map(|(planted, offset)| (planted, plus_days(planted, offset)))
}

fn known_variety_strategy() -> impl Strategy<Value = SugarcaneVariety> {
    prop::sample::select(SugarcaneVariety::KNOWN.to_vec())
}

fn stage_rank(stage: GrowthStage) -> u8 {
    match stage {
        GrowthStage::NotPlanted => 0,
        GrowthStage::Germination => 1,
        GrowthStage::Tillering => 2,
        GrowthStage::GrandGrowth => 3,
        GrowthStage::Maturation => 4,
        GrowthStage::Ripening => 5,
        GrowthStage::HarvestReady => 6,
        GrowthStage::Unknown => u8::MAX,
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// DAP on the planting day is zero
    #[test]
    fn test_dap_zero_on_planting_day(planted in date_strategy()) {
        prop_assert_eq!(compute_dap(Some(planted), planted), Some(0));
    }

    /// DAP is never negative, even before planting
    #[test]
    fn test_dap_never_negative((planted, as_of) in planting_and_as_of_strategy()) {
        let dap = compute_dap(Some(planted), as_of).unwrap();
        prop_assert!(dap >= 0);
        if as_of >= planted {
            prop_assert_eq!(dap, (as_of - planted).num_days());
        } else {
            prop_assert_eq!(dap, 0);
        }
    }

    /// Every non-negative DAP maps to exactly one real stage
    #[test]
    fn test_stage_total_for_valid_dap(dap in 0i64..100_000) {
        let stage = growth_stage_for(Some(dap));
        prop_assert_ne!(stage, GrowthStage::Unknown);
        prop_assert_ne!(stage, GrowthStage::NotPlanted);
    }

    /// Stages never move backwards as DAP grows
    #[test]
    fn test_stage_monotonic(dap in 0i64..1_000, step in 0i64..400) {
        let earlier = stage_rank(growth_stage_for(Some(dap)));
        let later = stage_rank(growth_stage_for(Some(dap + step)));
        prop_assert!(earlier <= later);
    }

    /// Expected harvest minus planting equals the table entry
    #[test]
    fn test_expected_harvest_matches_table(
        planted in date_strategy(),
        variety in known_variety_strategy()
    ) {
        let table = VarietyTable::standard();
        let expected = expected_harvest_date(Some(planted), variety.label(), &table).unwrap();
        let days = (expected - planted).num_days();
        prop_assert_eq!(days, i64::from(variety.nominal_harvest_days().unwrap()));
    }

    /// Unknown varieties use the default of 365 days
    #[test]
    fn test_unknown_variety_uses_default(planted in date_strategy(), name in "[xz]{3,10} [0-9]{2}") {
        let table = VarietyTable::standard();
        let expected = expected_harvest_date(Some(planted), &name, &table).unwrap();
        prop_assert_eq!((expected - planted).num_days(), i64::from(DEFAULT_HARVEST_DAYS));
    }

    /// No planting date means no delay, whatever else is recorded
    #[test]
    fn test_no_delay_without_planting(
        basal in prop::option::of(date_strategy()),
        main in prop::option::of(date_strategy()),
        as_of in date_strategy()
    ) {
        let delay = check_fertilization_delay(None, basal, main, as_of);
        prop_assert!(!delay.is_delayed);
        prop_assert_eq!(delay.delay_days, 0);
        prop_assert_eq!(delay.delay_type, DelayType::None);
    }

    /// Never overdue while within the grace period
    #[test]
    fn test_not_overdue_within_grace(expected in date_strategy(), offset in -400i64..=30) {
        let as_of = plus_days(expected, offset);
        prop_assert!(!check_harvest_overdue(Some(expected), as_of).is_overdue);
    }

    /// Overdue days count from the end of the grace period
    #[test]
    fn test_overdue_days_past_grace(expected in date_strategy(), offset in 31i64..400) {
        let overdue = check_harvest_overdue(Some(expected), plus_days(expected, offset));
        prop_assert!(overdue.is_overdue);
        prop_assert_eq!(overdue.overdue_days, offset - 30);
    }

    /// Every value in a derived status refers to the same day
    #[test]
    fn test_derived_status_consistent((planted, as_of) in planting_and_as_of_strategy()) {
        let record = PlantingRecord::planted(planted, "LCP 85-384");
        let status = derive_status(&record, &VarietyTable::standard(), as_of);
        prop_assert_eq!(status.as_of, as_of);
        prop_assert_eq!(status.growth_stage, growth_stage_for(status.days_after_planting));
        let expected = status.expected_harvest_date.unwrap();
        prop_assert_eq!(status.days_remaining_to_harvest, Some((expected - as_of).num_days()));
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn planting_day_is_germination_with_harvest_next_new_year() {
        let planted = date("2024-01-01");
        let table = VarietyTable::standard();
        assert_eq!(
            expected_harvest_date(Some(planted), "LCP 85-384", &table),
            Some(date("2024-12-31"))
        );

        let engine = GrowthStageEngine::with_clock(table, FixedClock::at_date(planted));
        let status = engine.status(&PlantingRecord::planted(planted, "LCP 85-384"));
        assert_eq!(status.days_after_planting, Some(0));
        assert_eq!(status.growth_stage, GrowthStage::Germination);
    }

    #[test]
    fn day_50_is_tillering_with_basal_delay() {
        let planted = date("2024-01-01");
        let as_of = plus_days(planted, 50);
        assert_eq!(growth_stage_for(compute_dap(Some(planted), as_of)), GrowthStage::Tillering);

        let delay = check_fertilization_delay(Some(planted), None, None, as_of);
        assert!(delay.is_delayed);
        assert_eq!(delay.delay_days, 20);
        assert_eq!(delay.delay_type, DelayType::Basal);
    }

    #[test]
    fn day_70_reports_both_delays() {
        let planted = date("2024-01-01");
        let delay = check_fertilization_delay(Some(planted), None, None, plus_days(planted, 70));
        assert!(delay.is_delayed);
        assert_eq!(delay.delay_days, 40);
        assert_eq!(delay.delay_type, DelayType::Both);
    }

    #[test]
    fn forty_days_past_expected_is_ten_days_overdue() {
        let today = date("2025-06-15");
        let overdue = check_harvest_overdue(Some(plus_days(today, -40)), today);
        assert!(overdue.is_overdue);
        assert_eq!(overdue.overdue_days, 10);
    }

    #[test]
    fn overdue_outranks_delay_in_field_status() {
        // planted two years ago, never fertilized
        let today = date("2025-06-15");
        let record = PlantingRecord::planted(plus_days(today, -730), "PS 1");
        let status = derive_status(&record, &VarietyTable::standard(), today);
        assert!(status.harvest_overdue.is_overdue);
        assert!(status.fertilization_delay.is_delayed);
        assert_eq!(status.field_status, FieldStatus::Overdue);
        assert_eq!(field_status(&record, &VarietyTable::standard(), today), FieldStatus::Overdue);
    }

    #[test]
    fn harvest_ready_persists_without_recorded_harvest() {
        let planted = date("2020-01-01");
        let status = derive_status(
            &PlantingRecord::planted(planted, "PS 1"),
            &VarietyTable::standard(),
            date("2025-01-01"),
        );
        assert_eq!(status.growth_stage, GrowthStage::HarvestReady);
    }
}
