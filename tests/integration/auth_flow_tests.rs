// ===================================
// tests/integration/auth_flow_tests.rs
// ===================================
//! End-to-end session lifecycle against the flat-file directory.
use crate::test_utils::{
    fast_lockout_settings, flat_file_auth, login_request, register_request, PASSWORD,
};
use backend_lib::{
    auth::{AuthService, TokenIssuer},
    error::AuthError,
    storage::{FlatFileDirectory, UserDirectory},
};
use homeinv_common::{RefreshTokenRequest, UserTarget};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_lockout_lifecycle() {
    let settings = fast_lockout_settings();
    let (auth, directory, _temp_dir) = flat_file_auth(&settings);

    let user = auth
        .register(&register_request("alice", "alice@x.com"))
        .await
        .unwrap();

    let pair = auth.login(&login_request("alice", PASSWORD)).await.unwrap();
    assert!(!pair.access_token.is_empty());
    let record = directory.find_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(record.failed_login_attempts, 0);

    for attempt in 1..=5 {
        let result = auth.login(&login_request("alice", "Wrong123!")).await;
        if attempt < 5 {
            assert!(
                matches!(result, Err(AuthError::InvalidCredentials)),
                "attempt {attempt}"
            );
        } else {
            assert!(matches!(result, Err(AuthError::AccountLocked { .. })));
        }
    }

    // Correct password is still refused inside the window
    assert!(matches!(
        auth.login(&login_request("alice", PASSWORD)).await,
        Err(AuthError::AccountLocked { .. })
    ));

    tokio::time::sleep(Duration::from_millis(1_100)).await;

    auth.login(&login_request("alice", PASSWORD)).await.unwrap();
    let record = directory.find_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(record.failed_login_attempts, 0);
    assert!(record.lockout_until.is_none());
    assert_eq!(record.total_lockouts, 1);
}

#[tokio::test]
async fn test_session_rotation_and_logout() {
    let settings = fast_lockout_settings();
    let (auth, directory, _temp_dir) = flat_file_auth(&settings);
    let issuer = TokenIssuer::new(&settings);

    let user = auth
        .register(&register_request("alice", "alice@x.com"))
        .await
        .unwrap();
    let first = auth.login(&login_request("alice@x.com", PASSWORD)).await.unwrap();

    let claims = issuer.verify_access_token(&first.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.user_id);

    let second = auth
        .refresh(
            user.user_id,
            &RefreshTokenRequest {
                user_id: user.user_id,
                refresh_token: first.refresh_token.clone(),
            },
        )
        .await
        .unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);

    // A new login replaces the grant from the refresh
    let third = auth.login(&login_request("alice", PASSWORD)).await.unwrap();
    let stale = RefreshTokenRequest {
        user_id: user.user_id,
        refresh_token: second.refresh_token,
    };
    assert!(matches!(
        auth.refresh(user.user_id, &stale).await,
        Err(AuthError::TokenInvalid(_))
    ));

    let ack = auth
        .logout(user.user_id, &UserTarget { user_id: user.user_id })
        .await
        .unwrap();
    assert!(ack.is_empty());

    let record = directory.find_by_id(user.user_id).await.unwrap().unwrap();
    assert!(record.refresh.is_none());
    let revoked = RefreshTokenRequest {
        user_id: user.user_id,
        refresh_token: third.refresh_token,
    };
    assert!(auth.refresh(user.user_id, &revoked).await.is_err());
}

#[tokio::test]
async fn test_state_survives_reopening_the_directory() {
    let settings = fast_lockout_settings();
    let (auth, _directory, temp_dir) = flat_file_auth(&settings);

    let user = auth
        .register(&register_request("alice", "alice@x.com"))
        .await
        .unwrap();
    auth.login(&login_request("alice", "Wrong123!")).await.unwrap_err();
    let pair = auth.login(&login_request("alice", PASSWORD)).await.unwrap();
    drop(auth);

    let reopened = Arc::new(FlatFileDirectory::new(temp_dir.path()).unwrap());
    let record = reopened.find_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(record.refresh.as_ref().unwrap().token, pair.refresh_token);
    assert!(record.password_matches(PASSWORD));
    assert!(record.last_login_at.is_some());
}

#[tokio::test]
async fn test_delete_account_frees_username() {
    let settings = fast_lockout_settings();
    let (auth, _directory, _temp_dir) = flat_file_auth(&settings);

    let user = auth
        .register(&register_request("alice", "alice@x.com"))
        .await
        .unwrap();
    auth.login(&login_request("alice", PASSWORD)).await.unwrap();

    let deleted = auth
        .delete_account(user.user_id, &UserTarget { user_id: user.user_id })
        .await
        .unwrap();
    assert_eq!(deleted.email, "alice@x.com");

    assert!(matches!(
        auth.delete_account(user.user_id, &UserTarget { user_id: user.user_id })
            .await,
        Err(AuthError::UserNotFound(_))
    ));

    let again = auth
        .register(&register_request("alice", "alice@x.com"))
        .await
        .unwrap();
    assert_ne!(again.user_id, user.user_id);
}

#[tokio::test]
async fn test_deleted_users_token_cannot_reach_next_account() {
    let settings = fast_lockout_settings();
    let (auth, _directory, _temp_dir) = flat_file_auth(&settings);
    let issuer = TokenIssuer::new(&settings);

    let alice = auth
        .register(&register_request("alice", "alice@x.com"))
        .await
        .unwrap();
    let pair = auth.login(&login_request("alice", PASSWORD)).await.unwrap();
    let stale_caller = issuer
        .verify_access_token(&pair.access_token)
        .unwrap()
        .user_id()
        .unwrap();
    auth.delete_account(alice.user_id, &UserTarget { user_id: alice.user_id })
        .await
        .unwrap();

    let eve = auth
        .register(&register_request("eve", "eve@x.com"))
        .await
        .unwrap();
    assert_ne!(eve.user_id, alice.user_id);

    assert!(matches!(
        auth.delete_account(stale_caller, &UserTarget { user_id: eve.user_id })
            .await,
        Err(AuthError::Unauthorized(_))
    ));
    assert!(auth.login(&login_request("eve", PASSWORD)).await.is_ok());
}
