// ================
// crates/common/src/lib.rs
// ================
//! Request and response types shared between the home-inventory auth server
//! and its clients.
//!
//! Field names follow the JSON contract of the inventory API (`camelCase`).

use serde::{Deserialize, Serialize};

/// Numeric user identifier assigned by the user directory
pub type UserId = i64;

/// Role given to every newly registered user
pub const ROLE_BASIC: &str = "Basic";

/// Role for administrative accounts
pub const ROLE_ADMIN: &str = "Admin";

/// Registration request
/// # Fields
/// * `user_name` - Unique login name
/// * `email` - Unique email address (stored lowercased)
/// * `password_string` - Plain password, hashed before it is stored
/// * `first_name` / `last_name` - Display names
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password_string: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request. `user_name` accepts either the username or the email.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password_string: String,
}

/// Logout and account-deletion request, naming the target user
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserTarget {
    pub user_id: UserId,
}

/// Refresh-token exchange request
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub user_id: UserId,
    pub refresh_token: String,
}

/// Access + refresh token pair returned by login and refresh.
///
/// Logout answers with an empty pair; clients must discard it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    /// The acknowledgement pair sent on logout
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty() && self.refresh_token.is_empty()
    }
}

/// Public view of a user record. Never carries credential material.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Error body rendered by the server for every failed request
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}
