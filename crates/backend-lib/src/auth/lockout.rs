// ============================
// crates/backend-lib/src/auth/lockout.rs
// ============================
//! Failed-login lockout for user accounts.
//!
//! All state lives on the [`UserRecord`]; the policy only holds parameters, so
//! it behaves the same across any number of server instances sharing a directory.

use chrono::{DateTime, Duration, Utc};

use crate::config::AuthSettings;
use crate::user::UserRecord;

/// Default number of failed attempts before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (15 minutes)
pub const DEFAULT_LOCKOUT_DURATION: Duration = Duration::minutes(15);

/// Lockout parameters
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCKOUT_DURATION)
    }
}

impl LockoutPolicy {
    /// Create a new lockout policy. A zero attempt limit is treated as 1.
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lockout_duration,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(settings.max_failed_attempts, settings.lockout_duration())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether the account is inside a lockout window at `now`
    pub fn is_locked_out(&self, record: &UserRecord, now: DateTime<Utc>) -> bool {
        record.lockout_until.is_some_and(|until| until > now)
    }

    /// The counter is still at the limit but the window has passed.
    pub fn needs_lazy_reset(&self, record: &UserRecord, now: DateTime<Utc>) -> bool {
        !self.is_locked_out(record, now) && record.failed_login_attempts >= self.max_attempts
    }

    /// Start a fresh attempt count after an expired lockout.
    /// Returns whether anything changed.
    pub fn lazy_reset(&self, record: &mut UserRecord, now: DateTime<Utc>) -> bool {
        if !self.needs_lazy_reset(record, now) {
            return false;
        }
        record.failed_login_attempts = 0;
        true
    }

    /// Record a failed authentication attempt.
    /// Returns `true` when this failure started a new lockout window.
    pub fn record_failure(&self, record: &mut UserRecord, now: DateTime<Utc>) -> bool {
        record.failed_login_attempts = record.failed_login_attempts.saturating_add(1);
        record.last_login_attempt_at = Some(now);

        if record.failed_login_attempts >= self.max_attempts {
            let until = now
                .checked_add_signed(self.lockout_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            record.lockout_until = Some(until);
            record.total_lockouts = record.total_lockouts.saturating_add(1);
            return true;
        }

        false
    }

    /// Record a successful authentication
    pub fn record_success(&self, record: &mut UserRecord, now: DateTime<Utc>) {
        record.failed_login_attempts = 0;
        record.lockout_until = None;
        record.last_login_at = Some(now);
        record.last_login_attempt_at = Some(now);
    }
}
