//! Login lockout property-based and unit tests
//!
//! Covers:
//! - Locks exactly on the configured attempt
//! - Lock expires after the configured duration
//! - Remaining attempts count down

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use shared::{check_at, record_failure_at, LockoutDecision, LockoutPolicy, LoginAttempts};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_720_000_000 + secs, 0).unwrap()
}

fn fail_times(policy: &LockoutPolicy, times: u32, now: DateTime<Utc>) -> LoginAttempts {
    (0..times).fold(LoginAttempts::default(), |record, _| {
        record_failure_at(policy, &record, now)
    })
}

proptest! {
    #[test]
    fn test_locks_on_max_attempt(max_attempts in 1u32..10, lock_seconds in 1i64..3_600) {
        let policy = LockoutPolicy { max_attempts, lock_seconds };

        let before = fail_times(&policy, max_attempts - 1, at(0));
        prop_assert!(check_at(&policy, &before, at(0)).is_allowed());

        let locked = record_failure_at(&policy, &before, at(0));
        prop_assert_eq!(locked.lock_until, Some(at(0) + Duration::seconds(lock_seconds)));
        prop_assert!(!check_at(&policy, &locked, at(lock_seconds - 1)).is_allowed());
        prop_assert!(check_at(&policy, &locked, at(lock_seconds)).is_allowed());
    }

    #[test]
    fn test_remaining_attempts_count_down(failures in 0u32..4) {
        let policy = LockoutPolicy::default();
        let record = fail_times(&policy, failures, at(0));
        prop_assert_eq!(
            check_at(&policy, &record, at(0)),
            LockoutDecision::Allowed { remaining_attempts: policy.max_attempts - failures }
        );
    }
}

mod unit_tests {
    use super::*;

    #[test]
    fn retry_after_rounds_up() {
        let policy = LockoutPolicy::default();
        let record = LoginAttempts {
            attempts: 0,
            lock_until: Some(at(10) + Duration::milliseconds(500)),
        };
        match check_at(&policy, &record, at(0)) {
            LockoutDecision::Locked { retry_after_secs, .. } => assert_eq!(retry_after_secs, 11),
            other => panic!("expected lock, got {:?}", other),
        }
    }

    #[test]
    fn decision_serializes_with_state_tag() {
        let json = serde_json::to_value(LockoutDecision::Allowed { remaining_attempts: 2 }).unwrap();
        assert_eq!(json["state"], "allowed");
        assert_eq!(json["remaining_attempts"], 2);
    }
}
