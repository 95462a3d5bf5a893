use super::models::{HealthCheck, UIConfiguration};
use crate::config::Config;
use crate::config::test_helpers::setup_test_app;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

#[test]
fn test_ui_configuration_default() {
    let config = UIConfiguration::default();
    assert_eq!(config.client_id, "");
    assert_eq!(config.realm, "");
    assert_eq!(config.url, "");
    assert_eq!(config.deployment, "");
}

#[test]
fn test_ui_configuration_from_config() {
    let config = UIConfiguration::from(&Config::for_tests());
    assert_eq!(config.client_id, "test-ui");
    assert_eq!(config.realm, "test-realm");
    assert_eq!(config.deployment, "test");

    // The UI expects camelCase for the client id
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["clientId"], "test-ui");
    assert!(json.get("client_id").is_none());
}

#[test]
fn test_health_check_serialization() {
    let health = HealthCheck {
        status: "ok".to_string(),
    };
    let json = serde_json::to_string(&health).unwrap();
    assert_eq!(json, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_healthz_endpoint() {
    let app = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ui_config_endpoint() {
    let app = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["realm"], "test-realm");
}
