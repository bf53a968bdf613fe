// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
/** Access and refresh token issuance.
Access tokens are HS512-signed JWTs carrying the user's id, name and role.
Refresh tokens are opaque random strings, stored on the user record and
compared by exact match. */
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use homeinv_common::{TokenPair, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::AuthSettings;
use crate::error::AuthError;
use crate::user::{RefreshGrant, UserRecord};

/// Refresh token size in bytes (32 bytes = 256 bits of entropy)
const REFRESH_TOKEN_BYTES: usize = 32;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Signed claims of an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string
    pub sub: String,
    pub name: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::TokenInvalid("subject is not a user id".to_string()))
    }
}

/** Generate a cryptographically secure random token
# Returns
A standard base64 encoded string (with padding) */
pub fn generate_refresh_token() -> String {
    generate_secure_token_with_size(REFRESH_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    STANDARD.encode(buffer)
}

/// Issues and verifies access tokens and mints refresh grants
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.signing_key.as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            access_ttl: settings.access_token_ttl(),
            refresh_ttl: settings.refresh_token_ttl(),
        }
    }

    /// Sign a short-lived access token for `user`
    pub fn issue_access_token(
        &self,
        user: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            role: user.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp: iat.saturating_add(self.access_ttl.num_seconds()),
        };
        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign access token: {e}")))
    }

    /// Mint a refresh token valid for the configured lifetime
    pub fn grant(&self, now: DateTime<Utc>) -> RefreshGrant {
        RefreshGrant {
            token: generate_refresh_token(),
            expires_at: now
                .checked_add_signed(self.refresh_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Issue a new pair and install the refresh grant on `user`, replacing any
    /// previous one. The caller persists the record.
    pub fn issue_pair(
        &self,
        user: &mut UserRecord,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self.issue_access_token(user, now)?;
        let grant = self.grant(now);
        let refresh_token = grant.token.clone();
        user.refresh = Some(grant);
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Check signature, expiry, issuer and audience of an access token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
