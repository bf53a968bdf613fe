// ==============================
// tests/unit/validation_tests.rs
// ==============================
//! Registration field rules
use backend_lib::validation::{
    validate_email, validate_name, validate_password, validate_register_request,
    validate_username,
};

use crate::test_utils::register_request;

#[test]
fn test_valid_registration() {
    assert!(validate_register_request(&register_request("alice_01", "alice@x.com")).is_ok());
}

#[test]
fn test_field_rules() {
    assert!(validate_email("a.b+c@example.co.uk").is_ok());
    assert!(validate_email("no-at-sign").is_err());
    assert!(validate_email("").is_err());

    assert!(validate_username("Bob_99").is_ok());
    assert!(validate_username("bob smith").is_err());
    assert!(validate_username("a_very_long_username").is_err());

    assert!(validate_name("Alice").is_ok());
    assert!(validate_name("Al1ce").is_err());
    assert!(validate_name("").is_err());

    assert!(validate_password("Secret123!").is_ok());
    assert!(validate_password("secret123!").is_err());
    assert!(validate_password("Secret!!!").is_err());
    assert!(validate_password("Secret123").is_err());
    assert!(validate_password("Se1!").is_err());
}

#[test]
fn test_all_failures_are_collected() {
    let mut req = register_request("bad name", "bad");
    req.first_name = String::new();
    req.last_name = "O'Neil".to_string();
    req.password_string = "password".to_string();

    let errors = validate_register_request(&req).unwrap_err();
    assert_eq!(
        errors.fields(),
        vec!["email", "firstName", "lastName", "passwordString", "userName"]
    );
}
