use crate::common::errors::BusinessResult;
use crate::strains::models::StrainSummary;
use crate::tanks::grid::TankLabel;
use crate::tanks::logs::models::TankLog;
use crate::tanks::notes::models::TankNote;
use crate::validation_error;
use chrono::{DateTime, NaiveDate, Utc};
use crudcrate::EntityToModels;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "tanks")]
#[crudcrate(
    api_struct = "Tank",
    name_singular = "tank",
    name_plural = "tanks",
    description = "Physical tanks on the facility racks. Strain assignment and stock counts change only through the lifecycle operations."
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    /// Rack position label, `{RACK}-{ROW}-{COL}`
    #[sea_orm(unique)]
    #[crudcrate(sortable, filterable, fulltext)]
    pub tank_id: String,
    #[crudcrate(update_model = false, create_model = false, filterable)]
    pub strain_id: Option<Uuid>,
    #[crudcrate(update_model = false, create_model = false, on_create = false, sortable, filterable)]
    pub active: bool,
    #[crudcrate(sortable)]
    pub dob: Option<NaiveDate>,
    #[crudcrate(update_model = false, create_model = false, sortable)]
    pub total_fish: Option<i32>,
    #[crudcrate(update_model = false, create_model = false)]
    pub larval_count: Option<i32>,
    #[crudcrate(update_model = false, create_model = false)]
    pub male_count: Option<i32>,
    #[crudcrate(update_model = false, create_model = false)]
    pub female_count: Option<i32>,
    #[crudcrate(update_model = false, create_model = false)]
    pub deceased_count: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(fulltext)]
    pub notes: Option<String>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable)]
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::strains::models::Entity",
        from = "Column::StrainId",
        to = "crate::strains::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Strains,
    #[sea_orm(has_many = "crate::tanks::notes::models::Entity")]
    TankNotes,
    #[sea_orm(has_many = "crate::tanks::logs::models::Entity")]
    TankLogs,
    #[sea_orm(has_many = "crate::archive::models::Entity")]
    TankArchive,
}

impl Related<crate::strains::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Strains.def()
    }
}

impl Related<crate::tanks::notes::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TankNotes.def()
    }
}

impl Related<crate::tanks::logs::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TankLogs.def()
    }
}

impl Related<crate::archive::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TankArchive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Canonical `RACK-ROW-COLUMN` form of a label, so one rack position has
/// exactly one spelling. Labels that do not name a position are rejected.
pub fn canonical_label(label: &str) -> BusinessResult<String> {
    TankLabel::parse(label)
        .map(|position| position.to_string())
        .ok_or_else(|| {
            validation_error!(
                "tank_id",
                format!("'{label}' must look like RACK-ROW-COLUMN, for example ARF1-A-1")
            )
        })
}

/// The five stock counts as recorded at one moment
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
pub struct CountSnapshot {
    pub total_fish: Option<i32>,
    pub larval_count: Option<i32>,
    pub male_count: Option<i32>,
    pub female_count: Option<i32>,
    pub deceased_count: Option<i32>,
}

impl CountSnapshot {
    /// Counts are either unknown or non-negative
    pub fn validate(&self) -> BusinessResult<()> {
        let fields = [
            ("total_fish", self.total_fish),
            ("larval_count", self.larval_count),
            ("male_count", self.male_count),
            ("female_count", self.female_count),
            ("deceased_count", self.deceased_count),
        ];
        for (field, value) in fields {
            if value.is_some_and(|v| v < 0) {
                return Err(validation_error!(field, "must not be negative"));
            }
        }
        Ok(())
    }
}

impl From<&Model> for CountSnapshot {
    fn from(tank: &Model) -> Self {
        Self {
            total_fish: tank.total_fish,
            larval_count: tank.larval_count,
            male_count: tank.male_count,
            female_count: tank.female_count,
            deceased_count: tank.deceased_count,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct AssignStrainRequest {
    pub strain_id: Uuid,
}

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct AddNoteRequest {
    pub note: String,
}

/// Clearing is irreversible and must be confirmed explicitly
#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::ToSchema)]
pub struct ClearTankRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// A tank with everything the detail page shows
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct TankDetail {
    #[serde(flatten)]
    pub tank: Tank,
    pub strain: Option<StrainSummary>,
    /// Newest first
    pub tank_notes: Vec<TankNote>,
    /// Newest first
    pub tank_logs: Vec<TankLog>,
}

/// List entry with the assigned strain's name
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct TankWithStrain {
    #[serde(flatten)]
    pub tank: Tank,
    pub strain_name: Option<String>,
}

/// An unassigned tank that can take a strain
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct AvailableTank {
    pub id: Uuid,
    pub tank_id: String,
}

/// Rows removed by a cascading tank delete
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct TankDeletion {
    pub id: Uuid,
    pub notes_deleted: u64,
    pub logs_deleted: u64,
    pub archive_entries_deleted: u64,
}

#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::IntoParams)]
pub struct TankQuery {
    pub active: Option<bool>,
    /// Rack, the first label segment, e.g. `ARF2`
    pub rack: Option<String>,
    /// Second label segment, e.g. `B`
    pub row: Option<String>,
}
