use chrono::{DateTime, Utc};
use crudcrate::EntityToModels;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "tank_notes")]
#[crudcrate(
    api_struct = "TankNote",
    name_singular = "tank_note",
    name_plural = "tank_notes",
    description = "Free-text observations appended to a tank's history."
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(filterable)]
    pub tank_id: Uuid,
    #[sea_orm(column_type = "Text")]
    #[crudcrate(fulltext)]
    pub note: String,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub timestamp: DateTime<Utc>,
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
}

impl Related<crate::tanks::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tanks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
