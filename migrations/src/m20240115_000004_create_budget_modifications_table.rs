use sea_orm_migration::prelude::*;

use super::m20240115_000003_create_documents_and_structures_tables::Documents;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BudgetModifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetModifications::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetModifications::Object)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetModifications::Description)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BudgetModifications::ApprovalDate)
                            .date()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BudgetModifications::DemandeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetModifications::ResponseId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BudgetModifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetModifications::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_modifications_demande")
                            .from(BudgetModifications::Table, BudgetModifications::DemandeId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_modifications_response")
                            .from(BudgetModifications::Table, BudgetModifications::ResponseId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Compound uniqueness contract: one approval per (date, demande).
        // NULL approval dates never collide under SQL null-distinct
        // semantics, which is exactly the pending-row behavior we want.
        manager
            .create_index(
                Index::create()
                    .name("idx_budget_modifications_approval_demande")
                    .table(BudgetModifications::Table)
                    .col(BudgetModifications::ApprovalDate)
                    .col(BudgetModifications::DemandeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_budget_modifications_approval_date")
                    .table(BudgetModifications::Table)
                    .col(BudgetModifications::ApprovalDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetModifications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BudgetModifications {
    Table,
    Id,
    Object,
    Description,
    ApprovalDate,
    DemandeId,
    ResponseId,
    CreatedAt,
    UpdatedAt,
}
