use crate::tanks::grid::RackLayout;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: Option<String>,
    pub app_name: String,
    pub keycloak_ui_id: String,
    pub keycloak_url: String,
    pub keycloak_realm: String,
    pub deployment: String,
    pub admin_role: String,
    pub racks: Vec<String>,
    pub rack_rows: Vec<String>,
    pub rack_columns: u32,
    pub tests_running: bool,
}

/// Split a comma separated environment value, dropping blanks.
fn list_from_env(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load from .env file if available
        let db_url = env::var("DB_URL").ok().or_else(|| {
            Some(format!(
                "{}://{}:{}@{}:{}/{}",
                env::var("DB_PREFIX").unwrap_or_else(|_| "postgresql".to_string()),
                env::var("DB_USER").expect("DB_USER must be set"),
                env::var("DB_PASSWORD").expect("DB_PASSWORD must be set"),
                env::var("DB_HOST").expect("DB_HOST must be set"),
                env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
                env::var("DB_NAME").expect("DB_NAME must be set"),
            ))
        });

        let defaults = RackLayout::default();

        Config {
            app_name: env::var("APP_NAME").expect("APP_NAME must be set"),
            keycloak_ui_id: env::var("KEYCLOAK_UI_ID").expect("KEYCLOAK_UI_ID must be set"),
            keycloak_url: env::var("KEYCLOAK_URL").expect("KEYCLOAK_URL must be set"),
            keycloak_realm: env::var("KEYCLOAK_REALM").expect("KEYCLOAK_REALM must be set"),
            deployment: env::var("DEPLOYMENT")
                .expect("DEPLOYMENT must be set, this can be local, dev, stage, or prod"),
            admin_role: env::var("ADMIN_ROLE").unwrap_or_else(|_| "zebrafish-admin".to_string()),
            racks: list_from_env("RACKS", &defaults.racks.join(",")),
            rack_rows: list_from_env("RACK_ROWS", &defaults.rows.join(",")),
            rack_columns: env::var("RACK_COLUMNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.columns),
            tests_running: false,
            db_url,
        }
    }

    /// Physical rack layout used for grid rendering
    pub fn rack_layout(&self) -> RackLayout {
        RackLayout {
            racks: self.racks.clone(),
            rows: self.rack_rows.clone(),
            columns: self.rack_columns,
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        let defaults = RackLayout::default();
        Config {
            app_name: "zebrafish-api-test".to_string(),
            keycloak_ui_id: "test-ui".to_string(),
            keycloak_url: String::new(),
            keycloak_realm: "test-realm".to_string(),
            deployment: "test".to_string(),
            admin_role: "zebrafish-admin".to_string(),
            racks: defaults.racks,
            rack_rows: defaults.rows,
            rack_columns: defaults.columns,
            tests_running: true,
            db_url: None,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::routes::build_router;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};

    /// Fresh database per test. Defaults to an in-memory `SQLite` database so
    /// tests are isolated; set `TEST_DB_URL` to run against Postgres instead.
    pub async fn setup_test_db() -> DatabaseConnection {
        let database_url =
            env::var("TEST_DB_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

        let mut options = ConnectOptions::new(database_url);
        // A second pooled connection to sqlite::memory: would see an empty database
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .expect("Failed to connect to test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run database migrations");

        db
    }

    pub async fn setup_test_app() -> Router {
        let db = setup_test_db().await;
        build_router(&db, &Config::for_tests())
    }

    /// Router and its database, for tests that check rows directly
    pub async fn setup_test_app_with_db() -> (Router, DatabaseConnection) {
        let db = setup_test_db().await;
        let router = build_router(&db, &Config::for_tests());
        (router, db)
    }
}
