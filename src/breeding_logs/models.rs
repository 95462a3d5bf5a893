use chrono::{DateTime, NaiveDate, Utc};
use crudcrate::{CRUDResource, EntityToModels};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// One entry of the bench breeding journal. Strain and tank are recorded as
/// typed at the bench and are not linked to the strain or tank tables.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "breeding_logs")]
#[crudcrate(
    generate_router,
    api_struct = "BreedingLog",
    name_singular = "breeding_log",
    name_plural = "breeding_logs",
    description = "Breeding journal: crosses set up, fish counts and outcomes."
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable)]
    pub date: NaiveDate,
    #[crudcrate(sortable, filterable, fulltext)]
    pub strain: String,
    #[crudcrate(sortable, filterable)]
    pub strain_id: Option<String>,
    #[crudcrate(sortable)]
    pub dob: Option<NaiveDate>,
    #[crudcrate(sortable, filterable)]
    pub num_fish: Option<i32>,
    #[crudcrate(filterable)]
    pub female_x_male: Option<String>,
    #[crudcrate(sortable, filterable)]
    pub tank_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(fulltext)]
    pub comments: Option<String>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, serde::Deserialize, utoipa::IntoParams)]
pub struct DateRange {
    /// First day, inclusive
    pub start: NaiveDate,
    /// Last day, inclusive
    pub end: NaiveDate,
}
