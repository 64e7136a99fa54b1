use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Budget types are a small referenced vocabulary (operating,
        // investment, ...) consumed by lookup only.
        manager
            .create_table(
                Table::create()
                    .table(BudgetTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetTypes::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetTypes::DesignationFr)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetTypes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinancialOperations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialOperations::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialOperations::Operation)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialOperations::BudgetYear)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialOperations::BudgetTypeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialOperations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialOperations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_operations_budget_type")
                            .from(
                                FinancialOperations::Table,
                                FinancialOperations::BudgetTypeId,
                            )
                            .to(BudgetTypes::Table, BudgetTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_financial_operations_operation")
                    .table(FinancialOperations::Table)
                    .col(FinancialOperations::Operation)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_financial_operations_budget_year")
                    .table(FinancialOperations::Table)
                    .col(FinancialOperations::BudgetYear)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialOperations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BudgetTypes {
    Table,
    Id,
    DesignationFr,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum FinancialOperations {
    Table,
    Id,
    Operation,
    BudgetYear,
    BudgetTypeId,
    CreatedAt,
    UpdatedAt,
}
