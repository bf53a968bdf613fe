// ============================
// crates/backend-lib/src/user.rs
// ============================
//! The per-user aggregate persisted by the user directory.
use chrono::{DateTime, Utc};
use homeinv_common::{UserId, UserSummary, ROLE_BASIC};
use serde::{Deserialize, Serialize};

use crate::auth::password;

/// An active refresh token and the instant it stops being accepted.
///
/// Token and expiry live in one value so neither can exist without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshGrant {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshGrant {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A registered user, as stored by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Assigned by the directory on insert; 0 until then
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "b64")]
    password_hash: Vec<u8>,
    #[serde(with = "b64")]
    password_salt: Vec<u8>,
    pub role: String,
    #[serde(default)]
    pub refresh: Option<RefreshGrant>,
    #[serde(default)]
    pub failed_login_attempts: u32,
    #[serde(default)]
    pub lockout_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_lockouts: u32,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Build a fresh, not-yet-inserted record with the base role and zeroed counters.
    /// The email is stored lowercased.
    pub fn new(
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        plain_password: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mut record = Self {
            id: 0,
            username: username.to_string(),
            email: email.to_lowercase(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash: Vec::new(),
            password_salt: Vec::new(),
            role: ROLE_BASIC.to_string(),
            refresh: None,
            failed_login_attempts: 0,
            lockout_until: None,
            last_login_attempt_at: None,
            last_login_at: None,
            total_lockouts: 0,
            created_at: now,
        };
        record.set_password(plain_password);
        record
    }

    /// Replace salt and hash together
    pub fn set_password(&mut self, plain_password: &str) {
        let salt = password::generate_salt();
        self.password_hash = password::hash_password(plain_password, &salt);
        self.password_salt = salt;
    }

    /// Constant-time check of a candidate password against the stored hash
    pub fn password_matches(&self, plain_password: &str) -> bool {
        password::verify_password(plain_password, &self.password_salt, &self.password_hash)
    }

    pub fn password_hash(&self) -> &[u8] {
        &self.password_hash
    }

    pub fn password_salt(&self) -> &[u8] {
        &self.password_salt
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            user_id: self.id,
            user_name: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role.clone(),
        }
    }
}

/// Byte fields are stored as standard base64 strings.
mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
