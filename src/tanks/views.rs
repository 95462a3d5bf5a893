use super::lifecycle;
use super::models::{
    AddNoteRequest, AssignStrainRequest, AvailableTank, ClearTankRequest, CountSnapshot, Tank,
    TankCreate, TankDeletion, TankDetail, TankQuery, TankUpdate, TankWithStrain,
};
use super::notes::models::TankNote;
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
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(list_tanks, create_tank))
        .routes(routes!(list_available_tanks))
        .routes(routes!(get_tank, update_tank, delete_tank))
        .routes(routes!(assign_strain))
        .routes(routes!(record_counts))
        .routes(routes!(add_note))
        .routes(routes!(clear_tank))
        .with_state(state.clone());

    protect(
        router,
        state,
        Tank::RESOURCE_NAME_PLURAL,
        vec![Role::administrator(&state.config)],
    )
}

#[utoipa::path(
    get,
    path = "/",
    params(TankQuery),
    responses(
        (status = 200, description = "Tanks with their strain names, newest first", body = Vec<TankWithStrain>),
        (status = 500, description = "Internal server error")
    ),
    tag = "tanks"
)]
pub async fn list_tanks(
    State(state): State<AppState>,
    Query(params): Query<TankQuery>,
) -> Result<Json<Vec<TankWithStrain>>, BusinessError> {
    Ok(Json(services::list_tanks(&state.db, &params).await?))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = TankCreate,
    responses(
        (status = 201, description = "Tank created", body = Tank),
        (status = 400, description = "Label is not a rack position"),
        (status = 409, description = "A tank with this label exists")
    ),
    tag = "tanks"
)]
pub async fn create_tank(
    State(state): State<AppState>,
    Json(create): Json<TankCreate>,
) -> Result<(StatusCode, Json<Tank>), BusinessError> {
    let tank = services::create_tank(&state.db, create).await?;
    Ok((StatusCode::CREATED, Json(tank)))
}

/// Tanks a strain can be assigned to
#[utoipa::path(
    get,
    path = "/available",
    responses(
        (status = 200, description = "Unassigned tanks ordered by label", body = Vec<AvailableTank>)
    ),
    tag = "tanks"
)]
pub async fn list_available_tanks(
    State(state): State<AppState>,
) -> Result<Json<Vec<AvailableTank>>, BusinessError> {
    Ok(Json(services::available_tanks(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Tank id")),
    responses(
        (status = 200, description = "Tank with strain, notes and count history", body = TankDetail),
        (status = 404, description = "Tank not found")
    ),
    tag = "tanks"
)]
pub async fn get_tank(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TankDetail>, BusinessError> {
    Ok(Json(services::fetch_tank_detail(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Tank id")),
    request_body = TankUpdate,
    responses(
        (status = 200, description = "Tank updated", body = Tank),
        (status = 400, description = "Label is not a rack position"),
        (status = 404, description = "Tank not found"),
        (status = 409, description = "A tank with this label exists")
    ),
    tag = "tanks"
)]
pub async fn update_tank(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<TankUpdate>,
) -> Result<Json<Tank>, BusinessError> {
    Ok(Json(services::update_tank(&state.db, id, update).await?))
}

/// Delete a tank together with its notes, count history and archive entries
#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Tank id")),
    responses(
        (status = 200, description = "Tank and dependent rows deleted", body = TankDeletion),
        (status = 404, description = "Tank not found"),
        (status = 500, description = "Delete stopped part way, see completed_steps")
    ),
    tag = "tanks"
)]
pub async fn delete_tank(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TankDeletion>, BusinessError> {
    Ok(Json(lifecycle::delete_tank(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/assign",
    params(("id" = Uuid, Path, description = "Tank id")),
    request_body = AssignStrainRequest,
    responses(
        (status = 200, description = "Strain assigned, tank is active", body = TankDetail),
        (status = 404, description = "Tank or strain not found"),
        (status = 422, description = "Tank already holds a strain")
    ),
    tag = "tanks"
)]
pub async fn assign_strain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignStrainRequest>,
) -> Result<Json<TankDetail>, BusinessError> {
    Ok(Json(
        lifecycle::assign_strain(&state.db, id, request.strain_id).await?,
    ))
}

/// Record a stock count. The tank's counts are overwritten and the snapshot is
/// appended to its log.
#[utoipa::path(
    post,
    path = "/{id}/counts",
    params(("id" = Uuid, Path, description = "Tank id")),
    request_body = CountSnapshot,
    responses(
        (status = 200, description = "Counts recorded", body = TankDetail),
        (status = 400, description = "Negative count"),
        (status = 404, description = "Tank not found"),
        (status = 500, description = "Counts updated but the log entry failed")
    ),
    tag = "tanks"
)]
pub async fn record_counts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(snapshot): Json<CountSnapshot>,
) -> Result<Json<TankDetail>, BusinessError> {
    Ok(Json(lifecycle::record_counts(&state.db, id, snapshot).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/notes",
    params(("id" = Uuid, Path, description = "Tank id")),
    request_body = AddNoteRequest,
    responses(
        (status = 201, description = "Note added", body = TankNote),
        (status = 400, description = "Empty note"),
        (status = 404, description = "Tank not found")
    ),
    tag = "tanks"
)]
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddNoteRequest>,
) -> Result<(StatusCode, Json<TankNote>), BusinessError> {
    let note = lifecycle::add_note(&state.db, id, &request.note).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Archive the tank's contents and free it for reuse. Irreversible, requires
/// `{"confirm": true}`.
#[utoipa::path(
    post,
    path = "/{id}/clear",
    params(("id" = Uuid, Path, description = "Tank id")),
    request_body = ClearTankRequest,
    responses(
        (status = 200, description = "Tank archived and emptied", body = TankDetail),
        (status = 400, description = "Clearing was not confirmed"),
        (status = 404, description = "Tank not found"),
        (status = 422, description = "Tank holds no strain"),
        (status = 500, description = "Clear stopped part way, see completed_steps")
    ),
    tag = "tanks"
)]
pub async fn clear_tank(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClearTankRequest>,
) -> Result<Json<TankDetail>, BusinessError> {
    Ok(Json(
        lifecycle::clear_tank(&state.db, id, request.confirm).await?,
    ))
}
