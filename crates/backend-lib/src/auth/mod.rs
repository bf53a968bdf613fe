// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication: credential hashing, lockout, tokens and the service
//! tying them together.

pub mod lockout;
pub mod password;
pub mod token;
mod service;
mod service_impl;

pub use lockout::LockoutPolicy;
pub use password::{constant_time_eq, hash_password, verify_password};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{Claims, TokenIssuer};
