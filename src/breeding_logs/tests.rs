use crate::config::test_helpers::setup_test_app;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
    (status, body)
}

async fn create_log(app: &axum::Router, date: &str, strain: &str) -> Value {
    let payload = json!({
        "date": date,
        "strain": strain,
        "strain_id": "ZF-77",
        "dob": "2024-11-02",
        "num_fish": 40,
        "female_x_male": "2x1",
        "tank_id": "ARF2-C-4",
        "comments": "good clutch"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/breeding_logs")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = extract_response_body(response).await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create breeding log: {body:?}");
    body
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    extract_response_body(response).await
}

#[tokio::test]
async fn test_breeding_log_crud() {
    let app = setup_test_app().await;

    let created = create_log(&app, "2025-02-10", "casper").await;
    assert_eq!(created["strain"], "casper");
    assert_eq!(created["num_fish"], 40);
    assert_eq!(created["date"], "2025-02-10");
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = get(&app, &format!("/api/breeding_logs/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["female_x_male"], "2x1");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/breeding_logs/{id}"))
                .header("content-type", "application/json")
                .body(Body::from(json!({"num_fish": 35}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, updated) = extract_response_body(response).await;
    assert_eq!(status, StatusCode::OK, "Update failed: {updated:?}");
    assert_eq!(updated["num_fish"], 35);

    let (status, list) = get(&app, "/api/breeding_logs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.is_array(), "List should be a direct array");
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_breeding_logs_between_dates() {
    let app = setup_test_app().await;
    create_log(&app, "2025-03-15", "nacre").await;
    create_log(&app, "2025-03-01", "casper").await;
    create_log(&app, "2025-04-20", "golden").await;

    let (status, body) = get(&app, "/api/breeding_logs/between?start=2025-03-01&end=2025-03-31").await;
    assert_eq!(status, StatusCode::OK);
    let strains: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["strain"].as_str().unwrap())
        .collect();
    assert_eq!(strains, vec!["casper", "nacre"]);

    let (status, _) = get(&app, "/api/breeding_logs/between?start=2025-04-01&end=2025-03-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/breeding_logs/between?start=2025-04-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
