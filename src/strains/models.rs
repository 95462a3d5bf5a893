use chrono::{DateTime, Utc};
use crudcrate::EntityToModels;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "strains")]
#[crudcrate(
    api_struct = "Strain",
    name_singular = "strain",
    name_plural = "strains",
    description = "Genetic lines of zebrafish kept in the facility."
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable, filterable, fulltext)]
    pub name: String,
    #[crudcrate(sortable, filterable, fulltext)]
    pub genotype: String,
    #[crudcrate(sortable, filterable)]
    pub strain_id_number: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(filterable, fulltext)]
    pub notes: Option<String>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::tanks::models::Entity")]
    Tanks,
    #[sea_orm(has_many = "crate::archive::models::Entity")]
    TankArchive,
}

impl Related<crate::tanks::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tanks.def()
    }
}

impl Related<crate::archive::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TankArchive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Strain creation, optionally placing the new strain into an empty tank
#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct CreateStrainRequest {
    #[serde(flatten)]
    pub strain: StrainCreate,
    /// Surrogate id of an unassigned tank
    pub assign_to_tank: Option<Uuid>,
}

/// Label of a tank currently holding the strain
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct AssignedTank {
    pub id: Uuid,
    pub tank_id: String,
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct StrainWithTanks {
    #[serde(flatten)]
    pub strain: Strain,
    pub tanks: Vec<AssignedTank>,
}

/// The subset of a strain shown next to tanks and archive entries
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct StrainSummary {
    pub id: Uuid,
    pub name: String,
    pub strain_id_number: Option<String>,
}

impl From<Model> for StrainSummary {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            strain_id_number: model.strain_id_number,
        }
    }
}
