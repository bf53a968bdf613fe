// ===================================
// tests/integration/http_flow_tests.rs
// ===================================
//! The auth routes driven through the router, without a socket.
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::test_utils::{test_router, PASSWORD};

fn request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response: Response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn register_and_login(app: &Router, username: &str, email: &str) -> (i64, String, String) {
    let (status, summary) = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            json!({
                "userName": username,
                "email": email,
                "passwordString": PASSWORD,
                "firstName": "Alice",
                "lastName": "Smith"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, pair) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            json!({ "userName": username, "passwordString": PASSWORD }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        summary["userId"].as_i64().unwrap(),
        pair["accessToken"].as_str().unwrap().to_string(),
        pair["refreshToken"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_refresh_then_logout_over_http() {
    let (app, _temp_dir) = test_router();
    let (user_id, access, refresh) = register_and_login(&app, "alice", "alice@x.com").await;

    let (status, rotated) = send(
        &app,
        request(
            "POST",
            "/api/auth/refresh-token",
            json!({ "userId": user_id, "refreshToken": &refresh }),
            Some(access.as_str()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["refreshToken"], json!(&refresh));

    // Replaying the spent token fails
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/refresh-token",
            json!({ "userId": user_id, "refreshToken": &refresh }),
            Some(access.as_str()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 1006);

    let (status, ack) = send(
        &app,
        request("POST", "/api/auth/logout", json!({ "userId": user_id }), Some(access.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "accessToken": "", "refreshToken": "" }));
}

#[tokio::test]
async fn test_cannot_act_on_another_account() {
    let (app, _temp_dir) = test_router();
    let (alice_id, _, _) = register_and_login(&app, "alice", "alice@x.com").await;
    let (_, bob_access, _) = register_and_login(&app, "bob", "bob@x.com").await;

    let (status, body) = send(
        &app,
        request("POST", "/api/auth/logout", json!({ "userId": alice_id }), Some(bob_access.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 1003);

    let (status, _) = send(
        &app,
        request("DELETE", "/api/users/me", json!({ "userId": alice_id }), Some(bob_access.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_account_over_http() {
    let (app, _temp_dir) = test_router();
    let (user_id, access, _) = register_and_login(&app, "alice", "alice@x.com").await;

    let (status, summary) = send(
        &app,
        request("DELETE", "/api/users/me", json!({ "userId": user_id }), Some(access.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["userName"], "alice");

    // The access token still verifies but the account is gone
    let (status, body) = send(
        &app,
        request("POST", "/api/auth/logout", json!({ "userId": user_id }), Some(access.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 1007);
}

#[tokio::test]
async fn test_locked_account_over_http() {
    let (app, _temp_dir) = test_router();
    register_and_login(&app, "alice", "alice@x.com").await;

    let mut last = (StatusCode::OK, Value::Null);
    for _ in 0..5 {
        last = send(
            &app,
            request(
                "POST",
                "/api/auth/login",
                json!({ "userName": "alice", "passwordString": "Wrong123!" }),
                None,
            ),
        )
        .await;
    }
    assert_eq!(last.0, StatusCode::LOCKED);
    assert_eq!(last.1["error"]["code"], 1002);
}
