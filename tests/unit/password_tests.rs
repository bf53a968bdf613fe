// ============================
// tests/unit/password_tests.rs
// ============================
//! Credential storage on user records
use backend_lib::auth::{hash_password, verify_password};
use backend_lib::auth::password::{generate_salt, HASH_LEN, SALT_LEN};
use backend_lib::user::UserRecord;
use chrono::Utc;

#[test]
fn test_password_hashing_and_verification() {
    let salt = generate_salt();
    assert_eq!(salt.len(), SALT_LEN);

    let hash = hash_password("SecureP@ssw0rd", &salt);
    assert_eq!(hash.len(), HASH_LEN);
    assert!(verify_password("SecureP@ssw0rd", &salt, &hash));
    assert!(!verify_password("SecureP@ssw0rD", &salt, &hash));
}

#[test]
fn test_record_never_keeps_plain_password() {
    let record = UserRecord::new("alice", "Alice@X.com", "Alice", "Smith", "Secret123!", Utc::now());

    assert_eq!(record.email, "alice@x.com");
    assert_eq!(record.password_salt().len(), SALT_LEN);
    assert_eq!(
        record.password_hash(),
        hash_password("Secret123!", record.password_salt()).as_slice()
    );

    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("Secret123!"));
}

#[test]
fn test_set_password_rotates_salt() {
    let mut record =
        UserRecord::new("alice", "alice@x.com", "Alice", "Smith", "Secret123!", Utc::now());
    let old_salt = record.password_salt().to_vec();

    record.set_password("Another456@");
    assert_ne!(record.password_salt(), old_salt.as_slice());
    assert!(record.password_matches("Another456@"));
    assert!(!record.password_matches("Secret123!"));
}
