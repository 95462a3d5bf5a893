use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// UUID primary key column. Postgres generates ids server side, `SQLite`
/// relies on the application supplying them.
fn uuid_primary_key<T>(manager: &SchemaManager, column: T) -> Result<ColumnDef, DbErr>
where
    T: IntoIden,
{
    let mut def = ColumnDef::new(column);
    def.uuid().not_null().primary_key();
    match manager.get_database_backend() {
        sea_orm::DatabaseBackend::Postgres => {
            def.default(Expr::cust("uuid_generate_v4()"));
        }
        sea_orm::DatabaseBackend::Sqlite => {}
        _ => {
            return Err(DbErr::Custom("Unsupported database backend".to_string()));
        }
    }
    Ok(def)
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)] // One table definition per entity
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Postgres {
            manager
                .get_connection()
                .execute_unprepared("CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\";")
                .await?;
        }

        // Strains
        manager
            .create_table(
                Table::create()
                    .table(Strains::Table)
                    .if_not_exists()
                    .col(uuid_primary_key(manager, Strains::Id)?)
                    .col(ColumnDef::new(Strains::Name).string().not_null())
                    .col(ColumnDef::new(Strains::Genotype).string().not_null())
                    .col(ColumnDef::new(Strains::StrainIdNumber).string())
                    .col(ColumnDef::new(Strains::Notes).text())
                    .col(
                        ColumnDef::new(Strains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Tanks. `tank_id` is the human label ({RACK}-{ROW}-{COL}), `id` the surrogate key
        manager
            .create_table(
                Table::create()
                    .table(Tanks::Table)
                    .if_not_exists()
                    .col(uuid_primary_key(manager, Tanks::Id)?)
                    .col(
                        ColumnDef::new(Tanks::TankId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tanks::StrainId).uuid())
                    .col(
                        ColumnDef::new(Tanks::Active)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tanks::Dob).date())
                    .col(ColumnDef::new(Tanks::TotalFish).integer())
                    .col(ColumnDef::new(Tanks::LarvalCount).integer())
                    .col(ColumnDef::new(Tanks::MaleCount).integer())
                    .col(ColumnDef::new(Tanks::FemaleCount).integer())
                    .col(ColumnDef::new(Tanks::DeceasedCount).integer())
                    .col(ColumnDef::new(Tanks::Notes).text())
                    .col(
                        ColumnDef::new(Tanks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tanks_strain_id")
                            .from(Tanks::Table, Tanks::StrainId)
                            .to(Strains::Table, Strains::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Tank notes (append only)
        manager
            .create_table(
                Table::create()
                    .table(TankNotes::Table)
                    .if_not_exists()
                    .col(uuid_primary_key(manager, TankNotes::Id)?)
                    .col(ColumnDef::new(TankNotes::TankId).uuid().not_null())
                    .col(ColumnDef::new(TankNotes::Note).text().not_null())
                    .col(
                        ColumnDef::new(TankNotes::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tank_notes_tank_id")
                            .from(TankNotes::Table, TankNotes::TankId)
                            .to(Tanks::Table, Tanks::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Tank stock-count log (append only)
        manager
            .create_table(
                Table::create()
                    .table(TankLogs::Table)
                    .if_not_exists()
                    .col(uuid_primary_key(manager, TankLogs::Id)?)
                    .col(ColumnDef::new(TankLogs::TankId).uuid().not_null())
                    .col(ColumnDef::new(TankLogs::TotalFish).integer())
                    .col(ColumnDef::new(TankLogs::LarvalCount).integer())
                    .col(ColumnDef::new(TankLogs::MaleCount).integer())
                    .col(ColumnDef::new(TankLogs::FemaleCount).integer())
                    .col(ColumnDef::new(TankLogs::DeceasedCount).integer())
                    .col(
                        ColumnDef::new(TankLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tank_logs_tank_id")
                            .from(TankLogs::Table, TankLogs::TankId)
                            .to(Tanks::Table, Tanks::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Tank archive (snapshot taken when a tank is cleared)
        manager
            .create_table(
                Table::create()
                    .table(TankArchive::Table)
                    .if_not_exists()
                    .col(uuid_primary_key(manager, TankArchive::Id)?)
                    .col(ColumnDef::new(TankArchive::TankId).uuid().not_null())
                    .col(ColumnDef::new(TankArchive::TankLabel).string())
                    .col(ColumnDef::new(TankArchive::StrainId).uuid())
                    .col(ColumnDef::new(TankArchive::TotalFish).integer())
                    .col(ColumnDef::new(TankArchive::LarvalCount).integer())
                    .col(ColumnDef::new(TankArchive::MaleCount).integer())
                    .col(ColumnDef::new(TankArchive::FemaleCount).integer())
                    .col(ColumnDef::new(TankArchive::DeceasedCount).integer())
                    .col(ColumnDef::new(TankArchive::Notes).text())
                    .col(
                        ColumnDef::new(TankArchive::ArchivedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tank_archive_tank_id")
                            .from(TankArchive::Table, TankArchive::TankId)
                            .to(Tanks::Table, Tanks::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tank_archive_strain_id")
                            .from(TankArchive::Table, TankArchive::StrainId)
                            .to(Strains::Table, Strains::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Breeding journal. Strain and tank are free-text labels as entered at the bench
        manager
            .create_table(
                Table::create()
                    .table(BreedingLogs::Table)
                    .if_not_exists()
                    .col(uuid_primary_key(manager, BreedingLogs::Id)?)
                    .col(ColumnDef::new(BreedingLogs::Date).date().not_null())
                    .col(ColumnDef::new(BreedingLogs::Strain).string().not_null())
                    .col(ColumnDef::new(BreedingLogs::StrainId).string())
                    .col(ColumnDef::new(BreedingLogs::Dob).date())
                    .col(ColumnDef::new(BreedingLogs::NumFish).integer())
                    .col(ColumnDef::new(BreedingLogs::FemaleXMale).string())
                    .col(ColumnDef::new(BreedingLogs::TankId).string())
                    .col(ColumnDef::new(BreedingLogs::Comments).text())
                    .col(
                        ColumnDef::new(BreedingLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Lab member profiles, keyed by the identity provider subject
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::AuthId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // ============ INDEXES ============
        manager
            .create_index(
                Index::create()
                    .name("idx_tanks_strain_id")
                    .table(Tanks::Table)
                    .col(Tanks::StrainId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tank_notes_tank_id")
                    .table(TankNotes::Table)
                    .col(TankNotes::TankId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tank_logs_tank_id")
                    .table(TankLogs::Table)
                    .col(TankLogs::TankId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tank_archive_archived_at")
                    .table(TankArchive::Table)
                    .col(TankArchive::ArchivedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_breeding_logs_date")
                    .table(BreedingLogs::Table)
                    .col(BreedingLogs::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children before parents
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BreedingLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TankArchive::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TankLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TankNotes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tanks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Strains::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Strains {
    Table,
    Id,
    Name,
    Genotype,
    StrainIdNumber,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tanks {
    Table,
    Id,
    TankId,
    StrainId,
    Active,
    Dob,
    TotalFish,
    LarvalCount,
    MaleCount,
    FemaleCount,
    DeceasedCount,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TankNotes {
    Table,
    Id,
    TankId,
    Note,
    Timestamp,
}

#[derive(DeriveIden)]
enum TankLogs {
    Table,
    Id,
    TankId,
    TotalFish,
    LarvalCount,
    MaleCount,
    FemaleCount,
    DeceasedCount,
    Timestamp,
}

#[derive(DeriveIden)]
enum TankArchive {
    Table,
    Id,
    TankId,
    TankLabel,
    StrainId,
    TotalFish,
    LarvalCount,
    MaleCount,
    FemaleCount,
    DeceasedCount,
    Notes,
    ArchivedAt,
}

#[derive(DeriveIden)]
enum BreedingLogs {
    Table,
    Id,
    Date,
    Strain,
    StrainId,
    Dob,
    NumFish,
    FemaleXMale,
    TankId,
    Comments,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    AuthId,
    Username,
    Email,
}
