// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for auth metric keys
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const LOGIN_REJECTED_LOCKED: &str = "auth.login.rejected_locked";
pub const ACCOUNT_LOCKED: &str = "auth.account.locked";
pub const TOKEN_REFRESHED: &str = "auth.token.refreshed";
pub const TOKEN_REFRESH_REJECTED: &str = "auth.token.refresh_rejected";
pub const USER_LOGGED_OUT: &str = "auth.user.logged_out";
pub const USER_DELETED: &str = "auth.user.deleted";
pub const STORAGE_ERROR: &str = "auth.storage.error";
