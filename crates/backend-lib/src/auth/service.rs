// ============================
// crates/backend-lib/src/auth/service.rs
// ============================
//! This module defines the `AuthService` trait, the boundary the HTTP layer calls.
use async_trait::async_trait;
use homeinv_common::{
    LoginRequest, RefreshTokenRequest, RegisterRequest, TokenPair, UserId, UserSummary,
    UserTarget,
};

use crate::error::AuthError;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. Never signs the user in.
    async fn register(&self, req: &RegisterRequest) -> Result<UserSummary, AuthError>;

    /// Verify credentials and issue a fresh token pair
    async fn login(&self, req: &LoginRequest) -> Result<TokenPair, AuthError>;

    /// Revoke the caller's refresh token; answers with an empty pair
    async fn logout(&self, caller: UserId, req: &UserTarget) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a new pair, invalidating the old token
    async fn refresh(
        &self,
        caller: UserId,
        req: &RefreshTokenRequest,
    ) -> Result<TokenPair, AuthError>;

    /// Revoke any session and delete the caller's account
    async fn delete_account(
        &self,
        caller: UserId,
        req: &UserTarget,
    ) -> Result<UserSummary, AuthError>;
}
