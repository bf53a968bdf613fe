// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Passwords are hashed with HMAC-SHA512 keyed by a per-user random salt.
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;
use zeroize::Zeroizing;

type HmacSha512 = Hmac<Sha512>;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Digest length of HMAC-SHA512
pub const HASH_LEN: usize = 64;

/// Generate a fresh random salt
pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Hash a password with the given salt as the HMAC key
pub fn hash_password(plain: &str, salt: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, including empty ones
    let Ok(mut mac) = HmacSha512::new_from_slice(salt) else {
        unreachable!("HMAC takes keys of any size");
    };
    mac.update(plain.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Verify a password against a stored salt and hash
pub fn verify_password(plain: &str, salt: &[u8], expected: &[u8]) -> bool {
    let candidate = Zeroizing::new(hash_password(plain, salt));
    constant_time_eq(&candidate, expected)
}

/// Compare two byte strings without exiting early on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
