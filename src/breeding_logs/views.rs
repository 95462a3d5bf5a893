use super::models::{self as breeding_logs, BreedingLog, DateRange, router as crudrouter};
use crate::common::auth::{Role, protect};
use crate::common::errors::{BusinessError, DbErrorExt};
use crate::common::state::AppState;
use crate::validation_error;
use axum::{
    Json,
    extract::{Query, State},
};
use crudcrate::CRUDResource;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = crudrouter(&state.db.clone()).merge(
        OpenApiRouter::new()
            .routes(routes!(breeding_logs_between))
            .with_state(state.clone()),
    );

    protect(
        router,
        state,
        BreedingLog::RESOURCE_NAME_PLURAL,
        vec![Role::administrator(&state.config)],
    )
}

/// Breeding logs dated within a range, oldest first
#[utoipa::path(
    get,
    path = "/between",
    params(DateRange),
    responses(
        (status = 200, description = "Logs dated from start to end inclusive", body = Vec<BreedingLog>),
        (status = 400, description = "Start is after end")
    ),
    tag = "breeding_logs"
)]
pub async fn breeding_logs_between(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<BreedingLog>>, BusinessError> {
    if range.start > range.end {
        return Err(validation_error!("start", "must not be after end"));
    }

    let logs = breeding_logs::Entity::find()
        .filter(breeding_logs::Column::Date.gte(range.start))
        .filter(breeding_logs::Column::Date.lte(range.end))
        .order_by_asc(breeding_logs::Column::Date)
        .all(&state.db)
        .await
        .map_err(|e| e.to_business_error("breeding_log"))?;

    Ok(Json(logs.into_iter().map(BreedingLog::from).collect()))
}
