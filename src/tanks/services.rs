use super::grid::{GridTank, TankLabel};
use super::logs::models::{self as tank_logs, TankLog};
use super::models::{
    self as tanks, AvailableTank, Tank, TankCreate, TankDetail, TankQuery, TankUpdate,
    TankWithStrain, canonical_label,
};
use super::notes::models::{self as tank_notes, TankNote};
use crate::archive::models as tank_archive;
use crate::common::errors::{BusinessResult, DbErrorExt};
use crate::{business_rule_violation, not_found};
use crate::strains::models::{self as strains, StrainSummary};
use crudcrate::traits::MergeIntoActiveModel;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

pub async fn find_tank<C: ConnectionTrait>(db: &C, id: Uuid) -> BusinessResult<tanks::Model> {
    tanks::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?
        .ok_or_else(|| not_found!("tank", id))
}

/// Tank with its strain, notes and count history, newest entries first
pub async fn fetch_tank_detail<C: ConnectionTrait>(db: &C, id: Uuid) -> BusinessResult<TankDetail> {
    let (tank, strain) = tanks::Entity::find_by_id(id)
        .find_also_related(strains::Entity)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?
        .ok_or_else(|| not_found!("tank", id))?;

    let notes = tank_notes::Entity::find()
        .filter(tank_notes::Column::TankId.eq(id))
        .order_by_desc(tank_notes::Column::Timestamp)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank_note"))?;

    let logs = tank_logs::Entity::find()
        .filter(tank_logs::Column::TankId.eq(id))
        .order_by_desc(tank_logs::Column::Timestamp)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank_log"))?;

    Ok(TankDetail {
        tank: tank.into(),
        strain: strain.map(StrainSummary::from),
        tank_notes: notes.into_iter().map(TankNote::from).collect(),
        tank_logs: logs.into_iter().map(TankLog::from).collect(),
    })
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub async fn list_tanks<C: ConnectionTrait>(
    db: &C,
    params: &TankQuery,
) -> BusinessResult<Vec<TankWithStrain>> {
    let mut query = tanks::Entity::find()
        .find_also_related(strains::Entity)
        .order_by_desc(tanks::Column::CreatedAt);

    if let Some(active) = params.active {
        query = query.filter(tanks::Column::Active.eq(active));
    }
    if let Some(rack) = non_blank(params.rack.as_ref()) {
        query = query.filter(tanks::Column::TankId.starts_with(format!("{rack}-")));
    }

    let rows = query
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;

    // Row is the middle label segment, which SQL cannot address portably
    let row = non_blank(params.row.as_ref());
    Ok(rows
        .into_iter()
        .filter(|(tank, _)| {
            row.is_none_or(|row| {
                TankLabel::parse(&tank.tank_id).is_some_and(|label| label.row.eq_ignore_ascii_case(row))
            })
        })
        .map(|(tank, strain)| TankWithStrain {
            tank: tank.into(),
            strain_name: strain.map(|s| s.name),
        })
        .collect())
}

/// Tanks without a strain, ordered by label
pub async fn available_tanks<C: ConnectionTrait>(db: &C) -> BusinessResult<Vec<AvailableTank>> {
    let rows = tanks::Entity::find()
        .filter(tanks::Column::StrainId.is_null())
        .order_by_asc(tanks::Column::TankId)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;

    Ok(rows
        .into_iter()
        .map(|tank| AvailableTank {
            id: tank.id,
            tank_id: tank.tank_id,
        })
        .collect())
}

/// Every tank with the strain fields the rack grid shows
pub async fn grid_tanks<C: ConnectionTrait>(db: &C) -> BusinessResult<Vec<GridTank>> {
    let rows = tanks::Entity::find()
        .find_also_related(strains::Entity)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;

    Ok(rows
        .into_iter()
        .map(|(tank, strain)| GridTank {
            id: tank.id,
            tank_id: tank.tank_id,
            active: tank.active,
            total_fish: tank.total_fish,
            strain_name: strain.as_ref().map(|s| s.name.clone()),
            strain_id_number: strain.and_then(|s| s.strain_id_number),
        })
        .collect())
}

/// A label recorded in the archive stays with the tank that was cleared under
/// it, so no other tank may take it while that history exists.
async fn ensure_label_not_archived<C: ConnectionTrait>(
    db: &C,
    label: &str,
    tank: Option<Uuid>,
) -> BusinessResult<()> {
    let mut query =
        tank_archive::Entity::find().filter(tank_archive::Column::TankLabel.eq(label));
    if let Some(id) = tank {
        query = query.filter(tank_archive::Column::TankId.ne(id));
    }

    let entries = query
        .count(db)
        .await
        .map_err(|e| e.to_business_error("tank_archive"))?;
    if entries > 0 {
        return Err(business_rule_violation!(
            "tank_label_archived",
            format!("Label {label} belongs to the archive history of another tank")
        ));
    }
    Ok(())
}

/// Create an empty, unassigned tank at a rack position
pub async fn create_tank<C: ConnectionTrait>(db: &C, mut create: TankCreate) -> BusinessResult<Tank> {
    create.tank_id = canonical_label(&create.tank_id)?;
    ensure_label_not_archived(db, &create.tank_id, None).await?;

    let active_model: tanks::ActiveModel = create.into();
    let inserted = active_model
        .insert(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;

    tracing::info!(tank = %inserted.tank_id, id = %inserted.id, "Created tank");
    Ok(inserted.into())
}

/// Update label, date of birth or notes. Assignment and counts are not
/// reachable from here.
pub async fn update_tank<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    update: TankUpdate,
) -> BusinessResult<Tank> {
    let existing = find_tank(db, id).await?;

    let mut merged = update
        .merge_into_activemodel(existing.into_active_model())
        .map_err(|e| e.to_business_error("tank"))?;
    if let ActiveValue::Set(label) = &merged.tank_id {
        let label = canonical_label(label)?;
        ensure_label_not_archived(db, &label, Some(id)).await?;
        merged.tank_id = ActiveValue::Set(label);
    }

    let updated = merged
        .update(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;
    Ok(updated.into())
}
