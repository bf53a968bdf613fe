// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Field validation for registration requests.
//!
//! Every check is a plain function returning a [`ValidationResult`]; nothing
//! here panics or relies on parse failures for control flow.

use homeinv_common::RegisterRequest;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_USERNAME_LENGTH: usize = 16;
const MAX_NAME_LENGTH: usize = 16;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 16;

/// Characters counted as "special" by the password policy
const PASSWORD_SPECIALS: &str = "!@#$%^&*";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username regex"));
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("name regex"));
static PASSWORD_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\d!@#$%^&*]+$").expect("password regex"));

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Per-field failures collected while validating a whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add(&mut self, field: &'static str, error: ValidationError) {
        self.errors.insert(field, error.to_string());
    }

    /// Names of the fields that failed, in stable order
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.keys().copied().collect()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    fn check<T>(&mut self, field: &'static str, result: ValidationResult<T>) {
        if let Err(e) = result {
            self.add(field, e);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Validate an email address is syntactically well formed
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email must not be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a username: 1-16 characters, alphanumeric or underscore
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.is_empty() || username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be 1-{MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "Username must contain only alphanumeric characters or underscores".to_string(),
        ));
    }

    Ok(username)
}

/// Validate a first or last name: 1-16 alphabetic characters
pub fn validate_name(name: &str) -> ValidationResult<&str> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name must be 1-{MAX_NAME_LENGTH} characters"
        )));
    }

    if !NAME_REGEX.is_match(name) {
        return Err(ValidationError::InvalidName(
            "Name must contain only alphabetic characters".to_string(),
        ));
    }

    Ok(name)
}

/// Validate password complexity
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.len() < MIN_PASSWORD_LENGTH || password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be {MIN_PASSWORD_LENGTH}-{MAX_PASSWORD_LENGTH} characters"
        )));
    }

    if !PASSWORD_CHARSET_REGEX.is_match(password) {
        return Err(ValidationError::InvalidPassword(format!(
            "Password may only contain letters, digits and {PASSWORD_SPECIALS}"
        )));
    }

    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if !(has_uppercase && has_lowercase && has_digit && has_special) {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must contain an uppercase letter, a lowercase letter, a digit and one of {PASSWORD_SPECIALS}"
        )));
    }

    Ok(password)
}

/// Validate every field of a registration request
pub fn validate_register_request(req: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    errors.check("email", validate_email(&req.email));
    errors.check("userName", validate_username(&req.user_name));
    errors.check("firstName", validate_name(&req.first_name));
    errors.check("lastName", validate_name(&req.last_name));
    errors.check("passwordString", validate_password(&req.password_string));

    if errors.is_valid() {
        Ok(())
    } else {
        Err(errors)
    }
}
