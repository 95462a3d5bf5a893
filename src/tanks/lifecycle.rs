//! Multi-step tank workflows.
//!
//! Each workflow runs its writes as a fixed sequence of steps on the given
//! connection, without a wrapping transaction. When a step fails after
//! earlier ones have committed, the caller gets
//! [`BusinessError::IncompleteOperation`] naming what already landed, so the
//! operator can finish or repair the tank by hand.

use super::logs::models as tank_logs;
use super::models::{self as tanks, CountSnapshot, TankDeletion, TankDetail};
use super::notes::models::{self as tank_notes, TankNote};
use super::services::{fetch_tank_detail, find_tank};
use crate::archive::models as tank_archive;
use crate::common::errors::{BusinessError, BusinessResult, DbErrorExt};
use crate::strains::models as strains;
use crate::{business_rule_violation, not_found, validation_error};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};
use std::future::Future;
use uuid::Uuid;

/// Bookkeeping for one run of an ordered workflow
struct Workflow {
    operation: &'static str,
    tank: Uuid,
    completed: Vec<&'static str>,
}

impl Workflow {
    fn new(operation: &'static str, tank: Uuid) -> Self {
        Self {
            operation,
            tank,
            completed: Vec::new(),
        }
    }

    async fn step<T, F>(&mut self, name: &'static str, context: &str, write: F) -> BusinessResult<T>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match write.await {
            Ok(value) => {
                tracing::debug!(operation = self.operation, tank = %self.tank, step = name, "Step committed");
                self.completed.push(name);
                Ok(value)
            }
            Err(err) if self.completed.is_empty() => {
                tracing::warn!(operation = self.operation, tank = %self.tank, step = name, error = %err, "First step failed, nothing was written");
                Err(err.to_business_error(context))
            }
            Err(err) => {
                tracing::warn!(
                    operation = self.operation,
                    tank = %self.tank,
                    step = name,
                    completed = ?self.completed,
                    error = %err,
                    "Workflow stopped part way"
                );
                Err(BusinessError::IncompleteOperation {
                    operation: self.operation.to_string(),
                    completed_steps: self.completed.iter().map(ToString::to_string).collect(),
                    failed_step: name.to_string(),
                    message: err.to_string(),
                })
            }
        }
    }
}

/// Put a strain into an empty tank, which makes the tank active
pub async fn assign_strain<C: ConnectionTrait>(
    db: &C,
    tank_id: Uuid,
    strain_id: Uuid,
) -> BusinessResult<TankDetail> {
    let tank = find_tank(db, tank_id).await?;
    strains::Entity::find_by_id(strain_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("strain"))?
        .ok_or_else(|| not_found!("strain", strain_id))?;

    if let Some(current) = tank.strain_id {
        return Err(business_rule_violation!(
            "tank_already_assigned",
            format!(
                "Tank {} already holds strain {current}, clear it first",
                tank.tank_id
            )
        ));
    }

    let mut workflow = Workflow::new("assign strain", tank_id);
    let assignment = tanks::ActiveModel {
        id: Set(tank_id),
        strain_id: Set(Some(strain_id)),
        active: Set(true),
        ..Default::default()
    };
    workflow
        .step("assign", "tank", assignment.update(db))
        .await?;

    tracing::info!(tank = %tank.tank_id, strain = %strain_id, "Assigned strain to tank");
    fetch_tank_detail(db, tank_id).await
}

/// Overwrite the tank's counts and append the same snapshot to its log
pub async fn record_counts<C: ConnectionTrait>(
    db: &C,
    tank_id: Uuid,
    snapshot: CountSnapshot,
) -> BusinessResult<TankDetail> {
    snapshot.validate()?;
    find_tank(db, tank_id).await?;

    let mut workflow = Workflow::new("record counts", tank_id);

    let counts = tanks::ActiveModel {
        id: Set(tank_id),
        total_fish: Set(snapshot.total_fish),
        larval_count: Set(snapshot.larval_count),
        male_count: Set(snapshot.male_count),
        female_count: Set(snapshot.female_count),
        deceased_count: Set(snapshot.deceased_count),
        ..Default::default()
    };
    workflow
        .step("update_counts", "tank", counts.update(db))
        .await?;

    let log = tank_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        tank_id: Set(tank_id),
        total_fish: Set(snapshot.total_fish),
        larval_count: Set(snapshot.larval_count),
        male_count: Set(snapshot.male_count),
        female_count: Set(snapshot.female_count),
        deceased_count: Set(snapshot.deceased_count),
        timestamp: Set(Utc::now()),
    };
    workflow
        .step("append_log", "tank_log", log.insert(db))
        .await?;

    fetch_tank_detail(db, tank_id).await
}

/// Append a free-text note
pub async fn add_note<C: ConnectionTrait>(
    db: &C,
    tank_id: Uuid,
    text: &str,
) -> BusinessResult<TankNote> {
    let text = text.trim();
    if text.is_empty() {
        return Err(validation_error!("note", "Note text must not be empty"));
    }
    find_tank(db, tank_id).await?;

    let note = tank_notes::ActiveModel {
        id: Set(Uuid::new_v4()),
        tank_id: Set(tank_id),
        note: Set(text.to_string()),
        timestamp: Set(Utc::now()),
    };
    let mut workflow = Workflow::new("add note", tank_id);
    let inserted = workflow
        .step("append_note", "tank_note", note.insert(db))
        .await?;

    Ok(inserted.into())
}

/// Archive the tank's current state, then empty it for reuse
pub async fn clear_tank<C: ConnectionTrait>(
    db: &C,
    tank_id: Uuid,
    confirm: bool,
) -> BusinessResult<TankDetail> {
    if !confirm {
        return Err(validation_error!(
            "confirm",
            "Clearing a tank cannot be undone and must be confirmed"
        ));
    }

    let tank = find_tank(db, tank_id).await?;
    if tank.strain_id.is_none() {
        return Err(business_rule_violation!(
            "tank_not_assigned",
            format!("Tank {} holds no strain, there is nothing to clear", tank.tank_id)
        ));
    }

    let now = Utc::now();
    let counts = CountSnapshot::from(&tank);
    let mut workflow = Workflow::new("clear tank", tank_id);

    let snapshot = tank_archive::ActiveModel {
        id: Set(Uuid::new_v4()),
        tank_id: Set(tank.id),
        tank_label: Set(Some(tank.tank_id.clone())),
        strain_id: Set(tank.strain_id),
        total_fish: Set(counts.total_fish),
        larval_count: Set(counts.larval_count),
        male_count: Set(counts.male_count),
        female_count: Set(counts.female_count),
        deceased_count: Set(counts.deceased_count),
        notes: Set(tank.notes.clone()),
        archived_at: Set(now),
    };
    workflow
        .step("archive", "tank_archive", snapshot.insert(db))
        .await?;

    let reset = tanks::ActiveModel {
        id: Set(tank_id),
        strain_id: Set(None),
        active: Set(false),
        total_fish: Set(None),
        larval_count: Set(None),
        male_count: Set(None),
        female_count: Set(None),
        deceased_count: Set(None),
        ..Default::default()
    };
    workflow.step("reset", "tank", reset.update(db)).await?;

    let note = tank_notes::ActiveModel {
        id: Set(Uuid::new_v4()),
        tank_id: Set(tank_id),
        note: Set(format!(
            "Tank cleared on {}",
            now.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        timestamp: Set(now),
    };
    workflow.step("note", "tank_note", note.insert(db)).await?;

    tracing::info!(tank = %tank.tank_id, "Cleared tank");
    fetch_tank_detail(db, tank_id).await
}

/// Remove a tank and everything that references it, children first
pub async fn delete_tank<C: ConnectionTrait>(db: &C, tank_id: Uuid) -> BusinessResult<TankDeletion> {
    let tank = find_tank(db, tank_id).await?;
    let mut workflow = Workflow::new("delete tank", tank_id);

    let notes = workflow
        .step(
            "delete_notes",
            "tank_note",
            tank_notes::Entity::delete_many()
                .filter(tank_notes::Column::TankId.eq(tank_id))
                .exec(db),
        )
        .await?;
    let logs = workflow
        .step(
            "delete_logs",
            "tank_log",
            tank_logs::Entity::delete_many()
                .filter(tank_logs::Column::TankId.eq(tank_id))
                .exec(db),
        )
        .await?;
    let archive = workflow
        .step(
            "delete_archive",
            "tank_archive",
            tank_archive::Entity::delete_many()
                .filter(tank_archive::Column::TankId.eq(tank_id))
                .exec(db),
        )
        .await?;
    workflow
        .step(
            "delete_tank",
            "tank",
            tanks::Entity::delete_by_id(tank_id).exec(db),
        )
        .await?;

    tracing::info!(tank = %tank.tank_id, "Deleted tank");
    Ok(TankDeletion {
        id: tank_id,
        notes_deleted: notes.rows_affected,
        logs_deleted: logs.rows_affected,
        archive_entries_deleted: archive.rows_affected,
    })
}
