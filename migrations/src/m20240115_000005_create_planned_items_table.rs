use sea_orm_migration::prelude::*;

use super::m20240115_000001_create_catalog_tables::{Items, ItemStatuses};
use super::m20240115_000002_create_financial_operations_tables::FinancialOperations;
use super::m20240115_000004_create_budget_modifications_table::BudgetModifications;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Only the three base numeric fields are stored; total cost,
        // variance and every classification are recomputed on read.
        manager
            .create_table(
                Table::create()
                    .table(PlannedItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlannedItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::Designation)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::UnitCost)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::PlannedQuantity)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::AllocatedAmount)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::ItemStatusId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlannedItems::ItemId).uuid().not_null())
                    .col(
                        ColumnDef::new(PlannedItems::FinancialOperationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::BudgetModificationId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlannedItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_items_item_status")
                            .from(PlannedItems::Table, PlannedItems::ItemStatusId)
                            .to(ItemStatuses::Table, ItemStatuses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_items_item")
                            .from(PlannedItems::Table, PlannedItems::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_items_financial_operation")
                            .from(PlannedItems::Table, PlannedItems::FinancialOperationId)
                            .to(FinancialOperations::Table, FinancialOperations::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_items_budget_modification")
                            .from(PlannedItems::Table, PlannedItems::BudgetModificationId)
                            .to(BudgetModifications::Table, BudgetModifications::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_planned_items_item_id")
                    .table(PlannedItems::Table)
                    .col(PlannedItems::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_planned_items_financial_operation_id")
                    .table(PlannedItems::Table)
                    .col(PlannedItems::FinancialOperationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_planned_items_budget_modification_id")
                    .table(PlannedItems::Table)
                    .col(PlannedItems::BudgetModificationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlannedItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PlannedItems {
    Table,
    Id,
    Designation,
    UnitCost,
    PlannedQuantity,
    AllocatedAmount,
    ItemStatusId,
    ItemId,
    FinancialOperationId,
    BudgetModificationId,
    CreatedAt,
    UpdatedAt,
}
