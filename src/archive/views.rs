use super::export::{export_csv, export_filename};
use super::filter::ArchiveFilter;
use super::models::{ArchiveEntry, TankArchive};
use super::services;
use crate::common::auth::{Role, protect};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use crudcrate::CRUDResource;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(list_archive))
        .routes(routes!(export_archive))
        .with_state(state.clone());

    protect(
        router,
        state,
        TankArchive::RESOURCE_NAME_PLURAL,
        vec![Role::administrator(&state.config)],
    )
}

#[utoipa::path(
    get,
    path = "/",
    params(ArchiveFilter),
    responses(
        (status = 200, description = "Archived tank snapshots, newest first", body = Vec<ArchiveEntry>)
    ),
    tag = "archive"
)]
pub async fn list_archive(
    State(state): State<AppState>,
    Query(filter): Query<ArchiveFilter>,
) -> Result<Json<Vec<ArchiveEntry>>, BusinessError> {
    Ok(Json(services::list_archive(&state.db, &filter).await?))
}

/// Download the filtered archive as CSV
#[utoipa::path(
    get,
    path = "/export",
    params(ArchiveFilter),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String)
    ),
    tag = "archive"
)]
pub async fn export_archive(
    State(state): State<AppState>,
    Query(filter): Query<ArchiveFilter>,
) -> Result<Response, BusinessError> {
    let entries = services::list_archive(&state.db, &filter).await?;
    let csv = export_csv(&entries)?;
    let filename = export_filename(Utc::now());
    tracing::info!(rows = entries.len(), %filename, "Exported tank archive");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
