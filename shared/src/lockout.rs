//! Login attempt limiter
//!
//! Failed sign-ins are counted per identity in an explicit [`LoginAttempts`]
//! record that the caller persists. Reaching the policy's limit locks the
//! identity for a fixed duration and resets the counter.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOCK_SECONDS: i64 = 300;
/// Longest lock accepted from configuration: one year
pub const MAX_LOCK_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_seconds: i64,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_seconds: DEFAULT_LOCK_SECONDS,
        }
    }
}

impl LockoutPolicy {
    /// Non-negative lock length; values beyond chrono's range saturate
    pub fn lock_duration(&self) -> Duration {
        Duration::try_seconds(self.lock_seconds.max(0)).unwrap_or(Duration::MAX)
    }

    /// End of a lock starting at `now`, capped at the latest representable instant
    pub fn lock_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.lock_duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Persisted per-identity counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempts {
    pub attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
}

impl LoginAttempts {
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.map_or(false, |until| until > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockoutDecision {
    Allowed { remaining_attempts: u32 },
    Locked { until: DateTime<Utc>, retry_after_secs: i64 },
}

impl LockoutDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LockoutDecision::Allowed { .. })
    }
}

/// Whether a sign-in may be attempted at `now`
pub fn check_at(policy: &LockoutPolicy, record: &LoginAttempts, now: DateTime<Utc>) -> LockoutDecision {
    match record.lock_until {
        Some(until) if until > now => {
            let remaining = until - now;
            // round partial seconds up so the caller never retries early
            let mut retry_after_secs = remaining.num_seconds();
            if remaining > Duration::seconds(retry_after_secs) {
                retry_after_secs += 1;
            }
            LockoutDecision::Locked {
                until,
                retry_after_secs,
            }
        }
        _ => LockoutDecision::Allowed {
            remaining_attempts: policy.max_attempts.saturating_sub(record.attempts),
        },
    }
}

/// Count a failed sign-in. A failure while locked leaves the record unchanged.
pub fn record_failure_at(
    policy: &LockoutPolicy,
    record: &LoginAttempts,
    now: DateTime<Utc>,
) -> LoginAttempts {
    if record.is_locked_at(now) {
        return record.clone();
    }

    let attempts = record.attempts.saturating_add(1);
    if attempts >= policy.max_attempts {
        LoginAttempts {
            attempts: 0,
            lock_until: Some(policy.lock_until(now)),
        }
    } else {
        LoginAttempts {
            attempts,
            lock_until: None,
        }
    }
}

/// Limiter bound to a policy and a clock
#[derive(Debug, Clone)]
pub struct LoginRateLimiter<C = SystemClock> {
    policy: LockoutPolicy,
    clock: C,
}

impl LoginRateLimiter<SystemClock> {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> LoginRateLimiter<C> {
    pub fn with_clock(policy: LockoutPolicy, clock: C) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    pub fn check(&self, record: &LoginAttempts) -> LockoutDecision {
        check_at(&self.policy, record, self.clock.now())
    }

    pub fn record_failure(&self, record: &LoginAttempts) -> LoginAttempts {
        record_failure_at(&self.policy, record, self.clock.now())
    }

    /// A successful sign-in clears the record
    pub fn record_success(&self) -> LoginAttempts {
        LoginAttempts::default()
    }
}
