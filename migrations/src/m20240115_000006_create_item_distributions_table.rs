use sea_orm_migration::prelude::*;

use super::m20240115_000003_create_documents_and_structures_tables::Structures;
use super::m20240115_000005_create_planned_items_table::PlannedItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Deliberately no uniqueness over (planned_item_id, structure_id):
        // rebalancing may create several rows for the same pair.
        manager
            .create_table(
                Table::create()
                    .table(ItemDistributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemDistributions::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemDistributions::Quantity)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ItemDistributions::PlannedItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemDistributions::StructureId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemDistributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemDistributions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_distributions_planned_item")
                            .from(ItemDistributions::Table, ItemDistributions::PlannedItemId)
                            .to(PlannedItems::Table, PlannedItems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_distributions_structure")
                            .from(ItemDistributions::Table, ItemDistributions::StructureId)
                            .to(Structures::Table, Structures::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_distributions_planned_item_id")
                    .table(ItemDistributions::Table)
                    .col(ItemDistributions::PlannedItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_distributions_structure_id")
                    .table(ItemDistributions::Table)
                    .col(ItemDistributions::StructureId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemDistributions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ItemDistributions {
    Table,
    Id,
    Quantity,
    PlannedItemId,
    StructureId,
    CreatedAt,
    UpdatedAt,
}
