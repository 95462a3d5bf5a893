use super::models::{RegisterUser, UpdateUser, UserProfile};
use super::services;
use crate::common::auth::{CurrentIdentity, protect};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

/// Profiles are open to any signed-in lab member, no role required
pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(list_users, register_user))
        .routes(routes!(get_own_profile))
        .routes(routes!(get_user, update_user, delete_user))
        .with_state(state.clone());

    protect(router, state, "users", vec![])
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "All lab member profiles", body = Vec<UserProfile>),
        (status = 401, description = "Not signed in")
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentIdentity(_identity): CurrentIdentity,
) -> Result<Json<Vec<UserProfile>>, BusinessError> {
    Ok(Json(services::list_users(&state.db).await?))
}

/// Create the profile of the signed-in user
#[utoipa::path(
    post,
    path = "/",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Profile created", body = UserProfile),
        (status = 400, description = "Invalid email"),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Profile or email already registered")
    ),
    tag = "users"
)]
pub async fn register_user(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(request): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserProfile>), BusinessError> {
    let profile = services::register(&state.db, &identity, request).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = UserProfile),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No profile registered yet")
    ),
    tag = "users"
)]
pub async fn get_own_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<UserProfile>, BusinessError> {
    Ok(Json(
        services::get_profile(&state.db, &identity, identity.auth_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{auth_id}",
    params(("auth_id" = Uuid, Path, description = "Identity provider subject")),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Profile belongs to someone else"),
        (status = 404, description = "Profile not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(auth_id): Path<Uuid>,
) -> Result<Json<UserProfile>, BusinessError> {
    Ok(Json(
        services::get_profile(&state.db, &identity, auth_id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/{auth_id}",
    params(("auth_id" = Uuid, Path, description = "Identity provider subject")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Username changed", body = UserProfile),
        (status = 400, description = "Blank username"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Profile belongs to someone else"),
        (status = 404, description = "Profile not found")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(auth_id): Path<Uuid>,
    Json(request): Json<UpdateUser>,
) -> Result<Json<UserProfile>, BusinessError> {
    Ok(Json(
        services::update_username(&state.db, &identity, auth_id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/{auth_id}",
    params(("auth_id" = Uuid, Path, description = "Identity provider subject")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Profile belongs to someone else"),
        (status = 404, description = "Profile not found")
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(auth_id): Path<Uuid>,
) -> Result<StatusCode, BusinessError> {
    services::delete_profile(&state.db, &identity, auth_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
