use super::models::{self as strains, AssignedTank, Strain, StrainCreate, StrainUpdate, StrainWithTanks};
use crate::archive::models as tank_archive;
use crate::common::errors::{BusinessError, BusinessResult, DbErrorExt};
use crate::tanks::lifecycle;
use crate::tanks::services::find_tank;
use crate::tanks::models as tanks;
use crate::{business_rule_violation, not_found, validation_error};
use crudcrate::traits::MergeIntoActiveModel;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;
use uuid::Uuid;

fn required(field: &str, value: &str) -> BusinessResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation_error!(field, "must not be empty"));
    }
    Ok(value.to_string())
}

pub async fn find_strain<C: ConnectionTrait>(db: &C, id: Uuid) -> BusinessResult<strains::Model> {
    strains::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("strain"))?
        .ok_or_else(|| not_found!("strain", id))
}

/// Strains newest first, each with the labels of the tanks holding it.
/// `name` narrows to strains whose name contains it, ignoring case.
pub async fn list_strains<C: ConnectionTrait>(
    db: &C,
    name: Option<&str>,
) -> BusinessResult<Vec<StrainWithTanks>> {
    let models = strains::Entity::find()
        .order_by_desc(strains::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("strain"))?;

    let assigned = tanks::Entity::find()
        .filter(tanks::Column::StrainId.is_not_null())
        .order_by_asc(tanks::Column::TankId)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;

    let mut by_strain: HashMap<Uuid, Vec<AssignedTank>> = HashMap::new();
    for tank in assigned {
        if let Some(strain_id) = tank.strain_id {
            by_strain.entry(strain_id).or_default().push(AssignedTank {
                id: tank.id,
                tank_id: tank.tank_id,
            });
        }
    }

    let needle = name
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty());

    Ok(models
        .into_iter()
        .filter(|model| {
            needle
                .as_ref()
                .is_none_or(|needle| model.name.to_lowercase().contains(needle))
        })
        .map(|model| StrainWithTanks {
            tanks: by_strain.remove(&model.id).unwrap_or_default(),
            strain: model.into(),
        })
        .collect())
}

pub async fn get_strain<C: ConnectionTrait>(db: &C, id: Uuid) -> BusinessResult<StrainWithTanks> {
    let model = find_strain(db, id).await?;
    let tanks = tanks::Entity::find()
        .filter(tanks::Column::StrainId.eq(id))
        .order_by_asc(tanks::Column::TankId)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?
        .into_iter()
        .map(|tank| AssignedTank {
            id: tank.id,
            tank_id: tank.tank_id,
        })
        .collect();

    Ok(StrainWithTanks {
        strain: model.into(),
        tanks,
    })
}

/// Create a strain and, when `assign_to_tank` is given, place it in that
/// tank. The two writes are separate steps: if the assignment is refused the
/// strain still exists and the error says so.
pub async fn create_strain<C: ConnectionTrait>(
    db: &C,
    mut create: StrainCreate,
    assign_to_tank: Option<Uuid>,
) -> BusinessResult<StrainWithTanks> {
    create.name = required("name", &create.name)?;
    create.genotype = required("genotype", &create.genotype)?;

    // Refuse an unusable tank before anything is written
    if let Some(tank_id) = assign_to_tank {
        let tank = find_tank(db, tank_id).await?;
        if tank.strain_id.is_some() {
            return Err(business_rule_violation!(
                "tank_already_assigned",
                format!("Tank {} already holds a strain", tank.tank_id)
            ));
        }
    }

    let active_model: strains::ActiveModel = create.into();
    let inserted = active_model
        .insert(db)
        .await
        .map_err(|e| e.to_business_error("strain"))?;
    tracing::info!(strain = %inserted.name, id = %inserted.id, "Created strain");

    if let Some(tank_id) = assign_to_tank {
        if let Err(err) = lifecycle::assign_strain(db, tank_id, inserted.id).await {
            tracing::warn!(strain = %inserted.id, tank = %tank_id, error = %err, "Strain created but not assigned");
            return Err(BusinessError::IncompleteOperation {
                operation: "create strain".to_string(),
                completed_steps: vec!["create".to_string()],
                failed_step: "assign".to_string(),
                message: err.to_string(),
            });
        }
    }

    get_strain(db, inserted.id).await
}

pub async fn update_strain<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    update: StrainUpdate,
) -> BusinessResult<Strain> {
    let existing = find_strain(db, id).await?;

    let mut merged = update
        .merge_into_activemodel(existing.into_active_model())
        .map_err(|e| e.to_business_error("strain"))?;
    if let ActiveValue::Set(name) = &merged.name {
        let name = required("name", name)?;
        merged.name = ActiveValue::Set(name);
    }
    if let ActiveValue::Set(genotype) = &merged.genotype {
        let genotype = required("genotype", genotype)?;
        merged.genotype = ActiveValue::Set(genotype);
    }

    let updated = merged
        .update(db)
        .await
        .map_err(|e| e.to_business_error("strain"))?;
    Ok(updated.into())
}

/// Delete a strain that no tank holds and no archive entry remembers
pub async fn delete_strain<C: ConnectionTrait>(db: &C, id: Uuid) -> BusinessResult<()> {
    let strain = find_strain(db, id).await?;

    let tank_refs = tanks::Entity::find()
        .filter(tanks::Column::StrainId.eq(id))
        .count(db)
        .await
        .map_err(|e| e.to_business_error("tank"))?;
    let archive_refs = tank_archive::Entity::find()
        .filter(tank_archive::Column::StrainId.eq(id))
        .count(db)
        .await
        .map_err(|e| e.to_business_error("tank_archive"))?;

    if tank_refs > 0 || archive_refs > 0 {
        return Err(business_rule_violation!(
            "strain_in_use",
            format!(
                "Strain {} is held by {tank_refs} tank(s) and recorded in {archive_refs} archive entries",
                strain.name
            )
        ));
    }

    strains::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| e.to_business_error("strain"))?;
    tracing::info!(strain = %strain.name, "Deleted strain");
    Ok(())
}
