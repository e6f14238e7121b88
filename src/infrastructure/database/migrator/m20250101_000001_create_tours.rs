//! Create tours table
//!
//! Catalog fields the booking core reads: prices, limits, publication state.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tours::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tours::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tours::Title).string().not_null())
                    .col(ColumnDef::new(Tours::PricePerPerson).string().not_null())
                    .col(ColumnDef::new(Tours::DiscountPrice).string())
                    .col(
                        ColumnDef::new(Tours::MaxGroupSize)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Tours::MaxTotalSlots)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tours::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Tours::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tours::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tours_status")
                    .table(Tours::Table)
                    .col(Tours::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tours::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Tours {
    Table,
    Id,
    Title,
    PricePerPerson,
    DiscountPrice,
    MaxGroupSize,
    MaxTotalSlots,
    Status,
    CreatedAt,
    UpdatedAt,
}
