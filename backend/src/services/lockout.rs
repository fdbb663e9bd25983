//! Login lockout service: persisted attempt counters keyed by identity

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shared::{Clock, LockoutDecision, LockoutPolicy, LoginAttempts, LoginRateLimiter};

use crate::error::{AppError, AppResult};

/// Lockout service backed by the `login_attempts` table
pub struct LockoutService<C> {
    db: PgPool,
    limiter: LoginRateLimiter<C>,
}

#[derive(Debug, sqlx::FromRow)]
struct LoginAttemptsRow {
    attempts: i32,
    lock_until: Option<DateTime<Utc>>,
}

impl From<LoginAttemptsRow> for LoginAttempts {
    fn from(row: LoginAttemptsRow) -> Self {
        LoginAttempts {
            attempts: u32::try_from(row.attempts).unwrap_or_default(),
            lock_until: row.lock_until,
        }
    }
}

/// Identities are compared case-insensitively
pub fn identity_key(identity: &str) -> AppResult<String> {
    let key = identity.trim().to_lowercase();
    if key.is_empty() || key.len() > 254 {
        return Err(AppError::invalid("identity", "Identity must be 1-254 characters"));
    }
    Ok(key)
}

impl<C: Clock> LockoutService<C> {
    /// Create a new LockoutService instance
    pub fn new(db: PgPool, policy: LockoutPolicy, clock: C) -> Self {
        Self {
            db,
            limiter: LoginRateLimiter::with_clock(policy, clock),
        }
    }

    async fn load(&self, key: &str) -> AppResult<LoginAttempts> {
        let row = sqlx::query_as::<_, LoginAttemptsRow>(
            "SELECT attempts, lock_until FROM login_attempts WHERE identity = $1",
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(LoginAttempts::from).unwrap_or_default())
    }

    async fn save(&self, key: &str, record: &LoginAttempts) -> AppResult<()> {
        let attempts = i32::try_from(record.attempts)
            .map_err(|_| AppError::Internal("attempt counter overflow".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO login_attempts (identity, attempts, lock_until, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (identity)
            DO UPDATE SET attempts = EXCLUDED.attempts,
                          lock_until = EXCLUDED.lock_until,
                          updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(attempts)
        .bind(record.lock_until)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Whether a sign-in may be attempted now
    pub async fn status(&self, identity: &str) -> AppResult<LockoutDecision> {
        let key = identity_key(identity)?;
        let record = self.load(&key).await?;
        Ok(self.limiter.check(&record))
    }

    /// Count a failed sign-in and return the resulting decision
    pub async fn record_failure(&self, identity: &str) -> AppResult<LockoutDecision> {
        let key = identity_key(identity)?;
        let record = self.load(&key).await?;
        let updated = self.limiter.record_failure(&record);
        self.save(&key, &updated).await?;

        let decision = self.limiter.check(&updated);
        if let LockoutDecision::Locked { until, .. } = &decision {
            tracing::warn!(identity = %key, %until, "Sign-in locked after repeated failures");
        }
        Ok(decision)
    }

    /// Clear the counter after a successful sign-in
    pub async fn reset(&self, identity: &str) -> AppResult<()> {
        let key = identity_key(identity)?;
        sqlx::query("DELETE FROM login_attempts WHERE identity = $1")
            .bind(&key)
            .execute(&self.db)
            .await?;
        tracing::debug!(identity = %key, "Login attempts cleared");
        Ok(())
    }

    /// Reject early when the identity is currently locked
    pub async fn ensure_allowed(&self, identity: &str) -> AppResult<u32> {
        match self.status(identity).await? {
            LockoutDecision::Allowed { remaining_attempts } => Ok(remaining_attempts),
            LockoutDecision::Locked {
                retry_after_secs, ..
            } => Err(AppError::LoginLocked { retry_after_secs }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_normalizes() {
        assert_eq!(identity_key("  Farmer@Example.com ").unwrap(), "farmer@example.com");
        assert!(identity_key("   ").is_err());
    }

    #[test]
    fn test_row_conversion() {
        let record = LoginAttempts::from(LoginAttemptsRow {
            attempts: 3,
            lock_until: None,
        });
        assert_eq!(record.attempts, 3);
    }
}
