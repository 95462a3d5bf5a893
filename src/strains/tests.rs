use crate::config::test_helpers::{setup_test_app, setup_test_app_with_db};
use crate::strains::models as strains;
use crate::tanks::lifecycle;
use crate::tanks::models as tanks;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, PaginatorTrait};
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

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
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

async fn insert_tank(db: &DatabaseConnection, label: &str) -> Uuid {
    tanks::ActiveModel {
        id: Set(Uuid::new_v4()),
        tank_id: Set(label.to_string()),
        strain_id: Set(None),
        active: Set(false),
        dob: Set(None),
        total_fish: Set(None),
        larval_count: Set(None),
        male_count: Set(None),
        female_count: Set(None),
        deceased_count: Set(None),
        notes: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert tank")
    .id
}

fn strain_json(name: &str) -> Value {
    json!({
        "name": name,
        "genotype": "mitfa(w2/w2); mpv17(a9/a9)",
        "strain_id_number": "ZIRC-123",
        "notes": "from ZIRC"
    })
}

#[tokio::test]
async fn test_strain_crud_operations() {
    let app = setup_test_app().await;

    let (status, created) = send(&app, "POST", "/api/strains", Some(strain_json("casper"))).await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create strain: {created:?}");
    assert_eq!(created["name"], "casper");
    assert_eq!(created["strain_id_number"], "ZIRC-123");
    assert_eq!(created["tanks"], json!([]));
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, "GET", &format!("/api/strains/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["genotype"], "mitfa(w2/w2); mpv17(a9/a9)");

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/strains/{id}"),
        Some(json!({"notes": "second generation"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Update failed: {updated:?}");
    assert_eq!(updated["notes"], "second generation");
    assert_eq!(updated["name"], "casper");

    let (status, _) = send(&app, "DELETE", &format!("/api/strains/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/strains/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "POST", "/api/strains", Some(strain_json("   "))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, list) = send(&app, "GET", "/api/strains", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_with_tank_assignment() {
    let (app, db) = setup_test_app_with_db().await;
    let tank = insert_tank(&db, "ARF1-C-2").await;

    let mut request = strain_json("nacre");
    request["assign_to_tank"] = json!(tank);
    let (status, created) = send(&app, "POST", "/api/strains", Some(request)).await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create strain: {created:?}");
    assert_eq!(created["tanks"][0]["tank_id"], "ARF1-C-2");

    let stored = tanks::Entity::find_by_id(tank).one(&db).await.unwrap().unwrap();
    assert!(stored.active);
    assert_eq!(
        stored.strain_id.map(|id| id.to_string()),
        created["id"].as_str().map(String::from)
    );

    // Occupied tank is refused before the second strain is written
    let mut request = strain_json("golden");
    request["assign_to_tank"] = json!(tank);
    let (status, _) = send(&app, "POST", "/api/strains", Some(request)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(strains::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_filters_by_name() {
    let app = setup_test_app().await;
    for name in ["casper", "Casper-TL", "nacre"] {
        let (status, _) = send(&app, "POST", "/api/strains", Some(strain_json(name))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, all) = send(&app, "GET", "/api/strains", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, matching) = send(&app, "GET", "/api/strains?name=CASP", None).await;
    let names: Vec<&str> = matching
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"casper"));
    assert!(names.contains(&"Casper-TL"));
}

#[tokio::test]
async fn test_strain_in_use_cannot_be_deleted() {
    let (app, db) = setup_test_app_with_db().await;
    let tank = insert_tank(&db, "ARF2-D-5").await;

    let (_, created) = send(&app, "POST", "/api/strains", Some(strain_json("casper"))).await;
    let strain = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();
    lifecycle::assign_strain(&db, tank, strain).await.unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/api/strains/{strain}"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "BUSINESS_RULE_VIOLATION");

    // Still referenced by the archive after the tank is cleared
    lifecycle::clear_tank(&db, tank, true).await.unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/strains/{strain}"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(strains::Entity::find_by_id(strain).one(&db).await.unwrap().is_some());
}
