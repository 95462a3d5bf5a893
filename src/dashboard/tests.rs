use crate::config::test_helpers::setup_test_app_with_db;
use crate::strains::models as strains;
use crate::tanks::lifecycle;
use crate::tanks::models::{self as tanks, CountSnapshot};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
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
    .unwrap()
    .id
}

async fn insert_strain(db: &DatabaseConnection) -> Uuid {
    strains::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("casper".to_string()),
        genotype: Set("roy;nacre".to_string()),
        strain_id_number: Set(Some("ZL1714".to_string())),
        notes: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

/// Locate a slot in the serialized grid
fn slot<'a>(grid: &'a Value, rack: &str, row: &str, column: u64) -> &'a Value {
    let section = grid["racks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["rack"] == rack)
        .unwrap();
    let grid_row = section["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["row"] == row)
        .unwrap();
    grid_row["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["column"] == column)
        .unwrap()
}

#[tokio::test]
async fn test_stats_count_active_tanks_only() {
    let (app, db) = setup_test_app_with_db().await;
    let strain = insert_strain(&db).await;
    let tank = insert_tank(&db, "ARF1-A-1").await;
    insert_tank(&db, "ARF1-A-2").await;
    lifecycle::assign_strain(&db, tank, strain).await.unwrap();

    let (status, stats) = get_json(&app, "/api/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["strains"], 1);
    assert_eq!(stats["active_tanks"], 1);
    assert_eq!(stats["breeding_logs"], 0);
    assert_eq!(stats["users"], 0);
}

#[tokio::test]
async fn test_grid_reflects_tank_states() {
    let (app, db) = setup_test_app_with_db().await;
    let strain = insert_strain(&db).await;
    let stocked = insert_tank(&db, "ARF3-B-5").await;
    let waiting = insert_tank(&db, "ARF3-B-6").await;
    insert_tank(&db, "ARF4-F-10").await;
    lifecycle::assign_strain(&db, stocked, strain).await.unwrap();
    lifecycle::assign_strain(&db, waiting, strain).await.unwrap();
    let counts = CountSnapshot {
        total_fish: Some(25),
        ..Default::default()
    };
    lifecycle::record_counts(&db, stocked, counts).await.unwrap();

    let (status, grid) = get_json(&app, "/api/dashboard/grid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grid["racks"].as_array().unwrap().len(), 6);

    let stocked_slot = slot(&grid, "ARF3", "B", 5);
    assert_eq!(stocked_slot["state"], "active_stocked");
    assert_eq!(stocked_slot["strain_name"], "casper");
    assert_eq!(stocked_slot["strain_id_number"], "ZL1714");
    assert_eq!(stocked_slot["tank"], stocked.to_string());

    assert_eq!(slot(&grid, "ARF3", "B", 6)["state"], "active_empty");
    assert_eq!(slot(&grid, "ARF4", "F", 10)["state"], "inactive");
    assert_eq!(slot(&grid, "ARF1", "A", 1)["state"], "empty");

    let expanded: Vec<&str> = grid["racks"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["expanded"] == true)
        .map(|s| s["rack"].as_str().unwrap())
        .collect();
    assert_eq!(expanded, vec!["ARF3"]);
}
