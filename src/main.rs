mod archive;
mod breeding_logs;
mod common;
mod config;
mod dashboard;
mod routes;
mod strains;
mod tanks;
mod users;

use crate::config::Config;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

#[tokio::main]
async fn main() {
    // Set up tracing/logging
    tracing_subscriber::fmt::init();
    tracing::info!("Starting server...");

    // Load configuration and environment variables to pass to the application
    let config: Config = Config::from_env();

    let Some(db_url) = config.db_url.as_ref() else {
        tracing::error!("No database URL configured, set DB_URL or the DB_* variables");
        std::process::exit(1);
    };

    let db: DatabaseConnection = match Database::connect(db_url).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "Could not connect to the database");
            std::process::exit(1);
        }
    };

    if db.ping().await.is_ok() {
        tracing::info!("Connected to the database");
    } else {
        tracing::warn!("Database did not answer ping");
    }

    if let Err(err) = Migrator::up(&db, None).await {
        tracing::error!(error = %err, "Failed to run migrations");
        std::process::exit(1);
    }
    tracing::info!("DB migrations complete");

    tracing::info!(
        "Starting server {} ({} deployment) ...",
        config.app_name,
        config.deployment.to_uppercase()
    );

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 3000));
    let router = routes::build_router(&db, &config);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "Could not bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {addr}");

    if let Err(err) = axum::serve(listener, router.into_make_service()).await {
        tracing::error!(error = %err, "Server stopped");
    }
}
