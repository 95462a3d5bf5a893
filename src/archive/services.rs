use super::filter::ArchiveFilter;
use super::models::{self as tank_archive, ArchiveEntry};
use crate::common::errors::{BusinessResult, DbErrorExt};
use crate::strains::models as strains;
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};

/// Archive entries with strain names, newest first, narrowed by `filter`
pub async fn list_archive<C: ConnectionTrait>(
    db: &C,
    filter: &ArchiveFilter,
) -> BusinessResult<Vec<ArchiveEntry>> {
    let rows = tank_archive::Entity::find()
        .find_also_related(strains::Entity)
        .order_by_desc(tank_archive::Column::ArchivedAt)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("tank_archive"))?;

    let entries = rows
        .into_iter()
        .map(|(entry, strain)| ArchiveEntry {
            entry: entry.into(),
            strain_name: strain.map(|s| s.name),
        })
        .collect();

    Ok(filter.apply(entries))
}
