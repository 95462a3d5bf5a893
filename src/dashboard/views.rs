use super::models::DashboardStats;
use crate::breeding_logs::models as breeding_logs;
use crate::common::auth::{Role, protect};
use crate::common::errors::{BusinessError, DbErrorExt};
use crate::common::state::AppState;
use crate::strains::models as strains;
use crate::tanks::grid::{RackGrid, derive_grid};
use crate::tanks::models as tanks;
use crate::tanks::services::grid_tanks;
use crate::users::models as users;
use axum::{Json, extract::State};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(get_stats))
        .routes(routes!(get_grid))
        .with_state(state.clone());

    protect(router, state, "dashboard", vec![Role::administrator(&state.config)])
}

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Facility counters", body = DashboardStats)
    ),
    tag = "dashboard"
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, BusinessError> {
    let db = &state.db;

    let strains = strains::Entity::find()
        .count(db)
        .await
        .map_err(|e| e.to_business_error("strain"))?;
    let active_tanks = tanks::Entity::find()
        .filter(tanks::Column::Active.eq(true))
        .count(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;
    let breeding_logs = breeding_logs::Entity::find()
        .count(db)
        .await
        .map_err(|e| e.to_business_error("breeding_log"))?;
    let users = users::Entity::find()
        .count(db)
        .await
        .map_err(|e| e.to_business_error("user"))?;

    Ok(Json(DashboardStats {
        strains,
        active_tanks,
        breeding_logs,
        users,
    }))
}

/// Every rack position of the configured layout with its tank, if any
#[utoipa::path(
    get,
    path = "/grid",
    responses(
        (status = 200, description = "Rack grid", body = RackGrid)
    ),
    tag = "dashboard"
)]
pub async fn get_grid(State(state): State<AppState>) -> Result<Json<RackGrid>, BusinessError> {
    let tanks = grid_tanks(&state.db).await?;
    let grid = derive_grid(&state.config.rack_layout(), &tanks);
    tracing::debug!(tanks = tanks.len(), expanded = ?grid.expanded_racks(), "Derived rack grid");
    Ok(Json(grid))
}
