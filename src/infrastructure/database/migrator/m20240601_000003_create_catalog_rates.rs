//! Create catalog_rates join table

use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_rates::Rates;
use super::m20240601_000002_create_catalogs::Catalogs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CatalogRates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CatalogRates::CatalogId).integer().not_null())
                    .col(ColumnDef::new(CatalogRates::RateId).integer().not_null())
                    .col(
                        ColumnDef::new(CatalogRates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CatalogRates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CatalogRates::DeletedAt).timestamp_with_time_zone())
                    // One row per pair; reassignment reactivates it
                    .primary_key(
                        Index::create()
                            .col(CatalogRates::CatalogId)
                            .col(CatalogRates::RateId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_catalog_rates_catalog")
                            .from(CatalogRates::Table, CatalogRates::CatalogId)
                            .to(Catalogs::Table, Catalogs::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_catalog_rates_rate")
                            .from(CatalogRates::Table, CatalogRates::RateId)
                            .to(Rates::Table, Rates::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_rates_rate")
                    .table(CatalogRates::Table)
                    .col(CatalogRates::RateId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogRates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum CatalogRates {
    Table,
    CatalogId,
    RateId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
