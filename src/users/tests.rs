use crate::common::auth::Identity;
use crate::config::test_helpers::setup_test_app;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
    (status, body)
}

/// Request on behalf of `caller`, anonymous when `None`
async fn send_as(
    app: &axum::Router,
    caller: Option<Uuid>,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth_id) = caller {
        builder = builder.extension(Identity::new(auth_id));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    extract_response_body(response).await
}

#[tokio::test]
async fn test_register_and_view_own_profile() {
    let app = setup_test_app().await;
    let me = Uuid::new_v4();

    let (status, body) = send_as(
        &app,
        Some(me),
        "POST",
        "/api/users",
        Some(json!({"email": "ana.fish@lab.example"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Registration failed: {body:?}");
    assert_eq!(body["auth_id"], me.to_string());
    assert_eq!(body["username"], "ana.fish");

    let (status, body) = send_as(&app, Some(me), "GET", "/api/users/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana.fish@lab.example");

    let (status, body) = send_as(&app, Some(me), "GET", &format!("/api/users/{me}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ana.fish");

    // Registering twice is a conflict
    let (status, _) = send_as(
        &app,
        Some(me),
        "POST",
        "/api/users",
        Some(json!({"email": "other@lab.example"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_anonymous_requests_are_unauthorized() {
    let app = setup_test_app().await;

    for (method, uri) in [
        ("GET", "/api/users".to_string()),
        ("GET", "/api/users/me".to_string()),
        ("GET", format!("/api/users/{}", Uuid::new_v4())),
        ("DELETE", format!("/api/users/{}", Uuid::new_v4())),
    ] {
        let (status, body) = send_as(&app, None, method, &uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }
}

#[tokio::test]
async fn test_other_profiles_are_forbidden() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    send_as(
        &app,
        Some(owner),
        "POST",
        "/api/users",
        Some(json!({"email": "owner@lab.example", "username": "owner"})),
    )
    .await;

    let profile = format!("/api/users/{owner}");
    let (status, _) = send_as(&app, Some(intruder), "GET", &profile, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_as(
        &app,
        Some(intruder),
        "PUT",
        &profile,
        Some(json!({"username": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_as(&app, Some(intruder), "DELETE", &profile, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Missing profiles are reported as missing, not forbidden
    let (status, _) = send_as(
        &app,
        Some(intruder),
        "GET",
        &format!("/api/users/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The listing is open to every signed-in member
    let (status, list) = send_as(&app, Some(intruder), "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["username"], "owner");
}

#[tokio::test]
async fn test_edit_and_delete_own_profile() {
    let app = setup_test_app().await;
    let me = Uuid::new_v4();
    send_as(
        &app,
        Some(me),
        "POST",
        "/api/users",
        Some(json!({"email": "bo@lab.example"})),
    )
    .await;
    let profile = format!("/api/users/{me}");

    let (status, _) = send_as(&app, Some(me), "PUT", &profile, Some(json!({"username": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_as(
        &app,
        Some(me),
        "PUT",
        &profile,
        Some(json!({"username": "bo-the-breeder"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "bo-the-breeder");

    let (status, _) = send_as(&app, Some(me), "DELETE", &profile, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_as(&app, Some(me), "GET", "/api/users/me", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let app = setup_test_app().await;
    let (status, body) = send_as(
        &app,
        Some(Uuid::new_v4()),
        "POST",
        "/api/users",
        Some(json!({"email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
