// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `HOMEINV_AUTH__SIGNING_KEY`
pub const ENV_PREFIX: &str = "HOMEINV_";

/// Signing key used when none is configured. Only fit for local development.
pub const DEV_SIGNING_KEY: &str = "dev-only-signing-key-change-me-before-deploying-anywhere-0000";

const MIN_SIGNING_KEY_BYTES: usize = 32;
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Directory holding the flat-file user directory
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Token and lockout parameters
    pub auth: AuthSettings,
}

/// Token and lockout parameters consumed by the auth core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Symmetric key for access-token signatures
    pub signing_key: String,
    /// `iss` claim written into and required from access tokens
    pub issuer: String,
    /// `aud` claim written into and required from access tokens
    pub audience: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_days: u64,
    /// Consecutive failures that trigger a lockout
    pub max_failed_attempts: u32,
    pub lockout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            auth: AuthSettings::default(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            signing_key: DEV_SIGNING_KEY.to_string(),
            issuer: "homeinv-api".to_string(),
            audience: "homeinv-clients".to_string(),
            access_token_ttl_secs: 60 * 60 * 24, // 1 day
            refresh_token_ttl_days: 7,
            max_failed_attempts: 5,
            lockout_secs: 15 * 60,
        }
    }
}

impl AuthSettings {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        seconds(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        seconds(self.refresh_token_ttl_days.saturating_mul(24 * 60 * 60))
    }

    pub fn lockout_duration(&self) -> chrono::Duration {
        seconds(self.lockout_secs)
    }

    pub fn uses_dev_signing_key(&self) -> bool {
        self.signing_key == DEV_SIGNING_KEY
    }
}

fn seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

impl Settings {
    /// Load settings from `config.toml` in the working directory and the environment
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Load settings from an explicit TOML file, still honouring environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        Self::extract(
            Self::figment()
                .merge(Toml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Defaults, then `config.toml`, then `HOMEINV_*` environment variables
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the auth core cannot run with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!("invalid log level {:?}", self.log_level);
        }

        let auth = &self.auth;
        if auth.signing_key.len() < MIN_SIGNING_KEY_BYTES {
            bail!("signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes");
        }
        if auth.issuer.is_empty() || auth.audience.is_empty() {
            bail!("token issuer and audience must be set");
        }
        if auth.max_failed_attempts == 0 {
            bail!("max_failed_attempts must be at least 1");
        }
        for (name, secs) in [
            ("access_token_ttl_secs", auth.access_token_ttl_secs),
            ("refresh_token_ttl_days", auth.refresh_token_ttl_days.saturating_mul(86_400)),
            ("lockout_secs", auth.lockout_secs),
        ] {
            if secs == 0 || secs > MAX_TTL_SECS {
                bail!("{name} must be between 1 second and 10 years");
            }
        }
        Ok(())
    }
}
