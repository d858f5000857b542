//! Create ratebook_entries table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RatebookEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RatebookEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RatebookEntries::ClientId).string().not_null())
                    .col(
                        ColumnDef::new(RatebookEntries::WarehouseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RatebookEntries::OperatorId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RatebookEntries::ServiceId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RatebookEntries::Name).string().not_null())
                    .col(
                        ColumnDef::new(RatebookEntries::WeightMin)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RatebookEntries::WeightMax)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RatebookEntries::FixedFee)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(RatebookEntries::Percentage)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(RatebookEntries::CatalogId).integer())
                    .col(ColumnDef::new(RatebookEntries::RateId).integer())
                    .col(
                        ColumnDef::new(RatebookEntries::Dependent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RatebookEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RatebookEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RatebookEntries::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Propagation index: (catalog, rate) -> dependent rows
        manager
            .create_index(
                Index::create()
                    .name("idx_ratebook_source")
                    .table(RatebookEntries::Table)
                    .col(RatebookEntries::CatalogId)
                    .col(RatebookEntries::RateId)
                    .col(RatebookEntries::Dependent)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratebook_rate")
                    .table(RatebookEntries::Table)
                    .col(RatebookEntries::RateId)
                    .col(RatebookEntries::Dependent)
                    .to_owned(),
            )
            .await?;

        // Resolver lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_ratebook_lookup")
                    .table(RatebookEntries::Table)
                    .col(RatebookEntries::ClientId)
                    .col(RatebookEntries::WarehouseId)
                    .col(RatebookEntries::OperatorId)
                    .col(RatebookEntries::ServiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RatebookEntries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RatebookEntries {
    Table,
    Id,
    ClientId,
    WarehouseId,
    OperatorId,
    ServiceId,
    Name,
    WeightMin,
    WeightMax,
    FixedFee,
    Percentage,
    CatalogId,
    RateId,
    Dependent,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
