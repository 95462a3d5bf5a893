use super::models::{CreateStrainRequest, Strain, StrainUpdate, StrainWithTanks};
use super::services;
use crate::common::auth::{Role, protect};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use crudcrate::CRUDResource;
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(list_strains, create_strain))
        .routes(routes!(get_strain, update_strain, delete_strain))
        .with_state(state.clone());

    protect(
        router,
        state,
        Strain::RESOURCE_NAME_PLURAL,
        vec![Role::administrator(&state.config)],
    )
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StrainQuery {
    /// Case-insensitive part of the strain name
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/",
    params(StrainQuery),
    responses(
        (status = 200, description = "Strains newest first with the tanks holding them", body = Vec<StrainWithTanks>)
    ),
    tag = "strains"
)]
pub async fn list_strains(
    State(state): State<AppState>,
    Query(query): Query<StrainQuery>,
) -> Result<Json<Vec<StrainWithTanks>>, BusinessError> {
    Ok(Json(
        services::list_strains(&state.db, query.name.as_deref()).await?,
    ))
}

/// Create a strain, optionally assigning it to an empty tank straight away
#[utoipa::path(
    post,
    path = "/",
    request_body = CreateStrainRequest,
    responses(
        (status = 201, description = "Strain created", body = StrainWithTanks),
        (status = 400, description = "Name or genotype missing"),
        (status = 404, description = "Tank to assign not found"),
        (status = 422, description = "Tank to assign already holds a strain")
    ),
    tag = "strains"
)]
pub async fn create_strain(
    State(state): State<AppState>,
    Json(request): Json<CreateStrainRequest>,
) -> Result<(StatusCode, Json<StrainWithTanks>), BusinessError> {
    let strain = services::create_strain(&state.db, request.strain, request.assign_to_tank).await?;
    Ok((StatusCode::CREATED, Json(strain)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Strain id")),
    responses(
        (status = 200, description = "Strain with the tanks holding it", body = StrainWithTanks),
        (status = 404, description = "Strain not found")
    ),
    tag = "strains"
)]
pub async fn get_strain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StrainWithTanks>, BusinessError> {
    Ok(Json(services::get_strain(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Strain id")),
    request_body = StrainUpdate,
    responses(
        (status = 200, description = "Strain updated", body = Strain),
        (status = 400, description = "Name or genotype blank"),
        (status = 404, description = "Strain not found")
    ),
    tag = "strains"
)]
pub async fn update_strain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StrainUpdate>,
) -> Result<Json<Strain>, BusinessError> {
    Ok(Json(services::update_strain(&state.db, id, update).await?))
}

/// Delete a strain. Refused while any tank or archive entry refers to it.
#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Strain id")),
    responses(
        (status = 204, description = "Strain deleted"),
        (status = 404, description = "Strain not found"),
        (status = 422, description = "Strain is still in use")
    ),
    tag = "strains"
)]
pub async fn delete_strain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BusinessError> {
    services::delete_strain(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
