//! Create rates table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rates::OperatorId).string().not_null())
                    .col(ColumnDef::new(Rates::ServiceId).string().not_null())
                    .col(ColumnDef::new(Rates::Name).string().not_null())
                    .col(ColumnDef::new(Rates::WeightMin).double().not_null())
                    .col(ColumnDef::new(Rates::WeightMax).double().not_null())
                    .col(
                        ColumnDef::new(Rates::FixedFee)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Rates::Percentage)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Rates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rates::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rates_operator_service")
                    .table(Rates::Table)
                    .col(Rates::OperatorId)
                    .col(Rates::ServiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Rates {
    Table,
    Id,
    OperatorId,
    ServiceId,
    Name,
    WeightMin,
    WeightMax,
    FixedFee,
    Percentage,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
