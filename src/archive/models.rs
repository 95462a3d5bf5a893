use chrono::{DateTime, Utc};
use crudcrate::EntityToModels;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Snapshot of a tank taken when it was cleared. Rows are never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "tank_archive")]
#[crudcrate(
    api_struct = "TankArchive",
    name_singular = "tank_archive",
    name_plural = "tank_archive",
    description = "Historical record of cleared tanks."
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    /// Surrogate id of the cleared tank
    #[crudcrate(filterable)]
    pub tank_id: Uuid,
    /// Rack label the tank had when it was cleared
    #[crudcrate(sortable, filterable)]
    pub tank_label: Option<String>,
    #[crudcrate(filterable)]
    pub strain_id: Option<Uuid>,
    pub total_fish: Option<i32>,
    pub larval_count: Option<i32>,
    pub male_count: Option<i32>,
    pub female_count: Option<i32>,
    pub deceased_count: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub archived_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::tanks::models::Entity",
        from = "Column::TankId",
        to = "crate::tanks::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Tanks,
    #[sea_orm(
        belongs_to = "crate::strains::models::Entity",
        from = "Column::StrainId",
        to = "crate::strains::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Strains,
}

impl Related<crate::tanks::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tanks.def()
    }
}

impl Related<crate::strains::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Strains.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Archive entry joined with the name of the strain it held
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ArchiveEntry {
    #[serde(flatten)]
    pub entry: TankArchive,
    pub strain_name: Option<String>,
}

impl ArchiveEntry {
    /// Label shown for the tank, the surrogate id when no label was stored
    pub fn tank_display(&self) -> String {
        self.entry
            .tank_label
            .clone()
            .unwrap_or_else(|| self.entry.tank_id.to_string())
    }
}
