// ============================
// crates/backend-lib/src/routes.rs
// ============================
//! HTTP surface of the auth core.
use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use homeinv_common::{
    LoginRequest, RefreshTokenRequest, RegisterRequest, TokenPair, UserId, UserSummary,
    UserTarget, ROLE_ADMIN, ROLE_BASIC,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::AuthError;
use crate::AppState;

/// Build the router with all auth routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/refresh-token", post(refresh_token))
        .route("/api/auth/check-authorization", get(check_authorization))
        .route("/api/auth/admin-auth-check", get(admin_auth_check))
        .route("/api/auth/basic-auth-check", get(basic_auth_check))
        .route("/api/users/me", delete(delete_account))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The authenticated caller, taken from a valid `Authorization: Bearer` access token
#[derive(Debug, Clone)]
pub struct BearerUser {
    pub user_id: UserId,
    pub name: String,
    pub role: String,
}

impl FromRequestParts<Arc<AppState>> for BearerUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AuthError::Unauthorized("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Unauthorized("malformed authorization header".to_string()))?;

        let claims = state.tokens.verify_access_token(token)?;
        Ok(Self {
            user_id: claims.user_id()?,
            name: claims.name,
            role: claims.role,
        })
    }
}

impl BearerUser {
    /// Roles are compared exactly; there is no hierarchy between them
    pub fn require_role(&self, role: &str) -> Result<(), AuthError> {
        if self.role != role {
            return Err(AuthError::Forbidden(format!(
                "role {} may not access {role} operations",
                self.role
            )));
        }
        Ok(())
    }
}

/// Echo of the caller's identity
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerInfo {
    pub user_id: UserId,
    pub user_name: String,
    pub role: String,
}

async fn health() -> &'static str {
    "ok"
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let summary = state.auth.register(&req).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    state.auth.login(&req).await.map(Json)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    caller: BearerUser,
    Json(req): Json<UserTarget>,
) -> Result<Json<TokenPair>, AuthError> {
    state.auth.logout(caller.user_id, &req).await.map(Json)
}

async fn refresh_token(
    State(state): State<Arc<AppState>>,
    caller: BearerUser,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    state.auth.refresh(caller.user_id, &req).await.map(Json)
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    caller: BearerUser,
    Json(req): Json<UserTarget>,
) -> Result<Json<UserSummary>, AuthError> {
    state.auth.delete_account(caller.user_id, &req).await.map(Json)
}

impl From<BearerUser> for CallerInfo {
    fn from(caller: BearerUser) -> Self {
        Self {
            user_id: caller.user_id,
            user_name: caller.name,
            role: caller.role,
        }
    }
}

async fn check_authorization(caller: BearerUser) -> Json<CallerInfo> {
    Json(caller.into())
}

async fn admin_auth_check(caller: BearerUser) -> Result<Json<CallerInfo>, AuthError> {
    caller.require_role(ROLE_ADMIN)?;
    Ok(Json(caller.into()))
}

async fn basic_auth_check(caller: BearerUser) -> Result<Json<CallerInfo>, AuthError> {
    caller.require_role(ROLE_BASIC)?;
    Ok(Json(caller.into()))
}
