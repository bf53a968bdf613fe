// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Authentication and session lifecycle core for the home-inventory API.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod storage;
pub mod user;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, TokenIssuer};
use crate::config::Settings;
use crate::storage::UserDirectory;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Verifies bearer tokens on protected routes
    pub tokens: Arc<TokenIssuer>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state over the given user directory
    pub fn new<D: UserDirectory + 'static>(directory: Arc<D>, settings: Settings) -> Self {
        let service = DefaultAuth::from_settings(directory, &settings.auth);
        let tokens = service.tokens();

        Self {
            auth: Arc::new(service),
            tokens,
            settings: Arc::new(settings),
        }
    }
}
