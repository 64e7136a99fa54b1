pub use sea_orm_migration::prelude::*;

mod m20240115_000001_create_catalog_tables;
mod m20240115_000002_create_financial_operations_tables;
mod m20240115_000003_create_documents_and_structures_tables;
mod m20240115_000004_create_budget_modifications_table;
mod m20240115_000005_create_planned_items_table;
mod m20240115_000006_create_item_distributions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240115_000001_create_catalog_tables::Migration),
            Box::new(m20240115_000002_create_financial_operations_tables::Migration),
            Box::new(m20240115_000003_create_documents_and_structures_tables::Migration),
            Box::new(m20240115_000004_create_budget_modifications_table::Migration),
            Box::new(m20240115_000005_create_planned_items_table::Migration),
            Box::new(m20240115_000006_create_item_distributions_table::Migration),
        ]
    }
}
