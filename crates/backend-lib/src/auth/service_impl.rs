// ============================
// crates/backend-lib/src/auth/service_impl.rs
// ============================
//! Default `AuthService`: registration, the login state machine, logout,
//! refresh-token rotation and account deletion over a [`UserDirectory`].
use async_trait::async_trait;
use chrono::Utc;
use homeinv_common::{
    LoginRequest, RefreshTokenRequest, RegisterRequest, TokenPair, UserId, UserSummary,
    UserTarget,
};
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::password::constant_time_eq;
use super::{AuthService, LockoutPolicy, TokenIssuer};
use crate::config::AuthSettings;
use crate::error::{AuthError, DirectoryError};
use crate::metrics as keys;
use crate::storage::UserDirectory;
use crate::user::UserRecord;
use crate::validation::validate_register_request;

pub struct DefaultAuth<D: ?Sized> {
    directory: Arc<D>,
    lockout: LockoutPolicy,
    tokens: Arc<TokenIssuer>,
}

impl<D: UserDirectory + ?Sized> DefaultAuth<D> {
    pub fn new(directory: Arc<D>, lockout: LockoutPolicy, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            directory,
            lockout,
            tokens,
        }
    }

    pub fn from_settings(directory: Arc<D>, settings: &AuthSettings) -> Self {
        Self::new(
            directory,
            LockoutPolicy::from_settings(settings),
            Arc::new(TokenIssuer::new(settings)),
        )
    }

    pub fn tokens(&self) -> Arc<TokenIssuer> {
        Arc::clone(&self.tokens)
    }

    fn require_self(caller: UserId, target: UserId) -> Result<(), AuthError> {
        if caller != target {
            warn!(caller, target_user = target, "caller may only act on their own account");
            return Err(AuthError::Unauthorized(format!(
                "user {caller} cannot act on user {target}"
            )));
        }
        Ok(())
    }

    /// Persist the outcome of a failed attempt. A write failure is logged and
    /// swallowed so the caller still gets the authentication failure.
    async fn persist_failure(&self, user: &UserRecord) {
        match self.directory.update(user).await {
            Ok(()) => {},
            Err(DirectoryError::NotFound(_)) => {
                warn!(user_id = user.id, "account deleted during failed login attempt");
            },
            Err(e) => {
                error!(user_id = user.id, error = %e, "could not record failed login attempt");
                counter!(keys::STORAGE_ERROR).increment(1);
            },
        }
    }
}

fn storage_failure(operation: &'static str, err: DirectoryError) -> AuthError {
    if !matches!(err, DirectoryError::Duplicate { .. } | DirectoryError::NotFound(_)) {
        error!(operation, error = %err, "user directory failure");
        counter!(keys::STORAGE_ERROR).increment(1);
    }
    AuthError::from(err)
}

#[async_trait]
impl<D: UserDirectory + ?Sized + 'static> AuthService for DefaultAuth<D> {
    async fn register(&self, req: &RegisterRequest) -> Result<UserSummary, AuthError> {
        let email = req.email.to_lowercase();

        if self
            .directory
            .exists(&req.user_name, &email)
            .await
            .map_err(|e| storage_failure("exists", e))?
        {
            warn!(username = %req.user_name, "registration failed: duplicate username or email");
            return Err(AuthError::DuplicateEntry(
                "username or email already registered".to_string(),
            ));
        }

        if let Err(errors) = validate_register_request(req) {
            warn!(username = %req.user_name, fields = %errors, "registration failed: invalid fields");
            return Err(AuthError::FormatInvalid(errors));
        }

        let record = UserRecord::new(
            &req.user_name,
            &email,
            &req.first_name,
            &req.last_name,
            &req.password_string,
            Utc::now(),
        );
        let user = self
            .directory
            .insert(record)
            .await
            .map_err(|e| storage_failure("insert", e))?;

        counter!(keys::USER_REGISTERED).increment(1);
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user.summary())
    }

    async fn login(&self, req: &LoginRequest) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        info!(username = %req.user_name, "login attempt");

        let Some(mut user) = self
            .directory
            .find_by_username_or_email(&req.user_name)
            .await
            .map_err(|e| storage_failure("find_by_username_or_email", e))?
        else {
            counter!(keys::LOGIN_FAILED).increment(1);
            warn!(username = %req.user_name, "login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if let Some(until) = user.lockout_until.filter(|_| self.lockout.is_locked_out(&user, now)) {
            counter!(keys::LOGIN_REJECTED_LOCKED).increment(1);
            warn!(user_id = user.id, %until, "login failed: account locked");
            return Err(AuthError::AccountLocked { until });
        }

        // The window has passed: start counting afresh. Persisted together with
        // this attempt's outcome below.
        if self.lockout.lazy_reset(&mut user, now) {
            info!(user_id = user.id, "lockout expired, failed-attempt counter reset");
        }

        if !user.password_matches(&req.password_string) {
            let locked = self.lockout.record_failure(&mut user, now);
            self.persist_failure(&user).await;
            counter!(keys::LOGIN_FAILED).increment(1);

            if let Some(until) = user.lockout_until.filter(|_| locked) {
                counter!(keys::ACCOUNT_LOCKED).increment(1);
                warn!(user_id = user.id, %until, "login failed: account is now locked");
                return Err(AuthError::AccountLocked { until });
            }

            warn!(
                user_id = user.id,
                attempts = user.failed_login_attempts,
                "login failed: invalid credentials"
            );
            return Err(AuthError::InvalidCredentials);
        }

        self.lockout.record_success(&mut user, now);
        let pair = self.tokens.issue_pair(&mut user, now)?;
        // The account may have been deleted since it was read
        self.directory.update(&user).await.map_err(|e| match e {
            DirectoryError::NotFound(_) => {
                counter!(keys::LOGIN_FAILED).increment(1);
                warn!(user_id = user.id, "login failed: account deleted");
                AuthError::InvalidCredentials
            },
            e => storage_failure("update", e),
        })?;

        counter!(keys::LOGIN_SUCCEEDED).increment(1);
        info!(user_id = user.id, username = %user.username, "login succeeded");
        Ok(pair)
    }

    async fn logout(&self, caller: UserId, req: &UserTarget) -> Result<TokenPair, AuthError> {
        Self::require_self(caller, req.user_id)?;

        let mut user = self
            .directory
            .find_by_id(req.user_id)
            .await
            .map_err(|e| storage_failure("find_by_id", e))?
            .ok_or(AuthError::UserNotFound(req.user_id))?;

        user.refresh = None;
        self.directory
            .update(&user)
            .await
            .map_err(|e| storage_failure("update", e))?;

        counter!(keys::USER_LOGGED_OUT).increment(1);
        info!(user_id = user.id, "user logged out");
        Ok(TokenPair::empty())
    }

    async fn refresh(
        &self,
        caller: UserId,
        req: &RefreshTokenRequest,
    ) -> Result<TokenPair, AuthError> {
        Self::require_self(caller, req.user_id)?;
        let now = Utc::now();

        let user = self
            .directory
            .find_by_id(req.user_id)
            .await
            .map_err(|e| storage_failure("find_by_id", e))?;

        let valid = user.as_ref().and_then(|u| u.refresh.as_ref()).is_some_and(|grant| {
            constant_time_eq(grant.token.as_bytes(), req.refresh_token.as_bytes())
                && grant.is_live(now)
        });

        let Some(mut user) = user.filter(|_| valid) else {
            counter!(keys::TOKEN_REFRESH_REJECTED).increment(1);
            warn!(user_id = req.user_id, "refresh token invalid or expired");
            return Err(AuthError::TokenInvalid(
                "refresh token invalid or expired".to_string(),
            ));
        };

        // Overwrites the stored token: the presented one is now spent
        let pair = self.tokens.issue_pair(&mut user, now)?;
        self.directory.update(&user).await.map_err(|e| match e {
            DirectoryError::NotFound(_) => {
                counter!(keys::TOKEN_REFRESH_REJECTED).increment(1);
                warn!(user_id = user.id, "refresh rejected: account deleted");
                AuthError::TokenInvalid("refresh token invalid or expired".to_string())
            },
            e => storage_failure("update", e),
        })?;

        counter!(keys::TOKEN_REFRESHED).increment(1);
        info!(user_id = user.id, "tokens refreshed");
        Ok(pair)
    }

    async fn delete_account(
        &self,
        caller: UserId,
        req: &UserTarget,
    ) -> Result<UserSummary, AuthError> {
        Self::require_self(caller, req.user_id)?;

        let mut user = self
            .directory
            .find_by_id(req.user_id)
            .await
            .map_err(|e| storage_failure("find_by_id", e))?
            .ok_or(AuthError::UserNotFound(req.user_id))?;

        if user.refresh.take().is_some() {
            self.directory
                .update(&user)
                .await
                .map_err(|e| storage_failure("update", e))?;
        }

        self.directory
            .remove(user.id)
            .await
            .map_err(|e| storage_failure("remove", e))?
            .ok_or(AuthError::UserNotFound(user.id))?;

        counter!(keys::USER_DELETED).increment(1);
        info!(user_id = user.id, username = %user.username, "account deleted");
        Ok(user.summary())
    }
}
