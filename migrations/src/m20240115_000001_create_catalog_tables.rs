use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Domains: top level of the classification hierarchy
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Domains::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Domains::DesignationAr).string().null())
                    .col(ColumnDef::new(Domains::DesignationEn).string().null())
                    .col(ColumnDef::new(Domains::DesignationFr).string().not_null())
                    .col(
                        ColumnDef::new(Domains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Domains::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The unique index is the authority for designation collisions; the
        // service-level pre-check only improves the error message.
        manager
            .create_index(
                Index::create()
                    .name("idx_domains_designation_fr")
                    .table(Domains::Table)
                    .col(Domains::DesignationFr)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Rubrics: middle level, owned by a domain
        manager
            .create_table(
                Table::create()
                    .table(Rubrics::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rubrics::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Rubrics::DesignationAr).string().null())
                    .col(ColumnDef::new(Rubrics::DesignationEn).string().null())
                    .col(ColumnDef::new(Rubrics::DesignationFr).string().not_null())
                    .col(ColumnDef::new(Rubrics::DomainId).uuid().not_null())
                    .col(
                        ColumnDef::new(Rubrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rubrics::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rubrics_domain")
                            .from(Rubrics::Table, Rubrics::DomainId)
                            .to(Domains::Table, Domains::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rubrics_designation_fr")
                    .table(Rubrics::Table)
                    .col(Rubrics::DesignationFr)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rubrics_domain_id")
                    .table(Rubrics::Table)
                    .col(Rubrics::DomainId)
                    .to_owned(),
            )
            .await?;

        // Items: leaf level, referenced by planned items
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Items::DesignationAr).string().null())
                    .col(ColumnDef::new(Items::DesignationEn).string().null())
                    .col(ColumnDef::new(Items::DesignationFr).string().not_null())
                    .col(ColumnDef::new(Items::RubricId).uuid().not_null())
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_items_rubric")
                            .from(Items::Table, Items::RubricId)
                            .to(Rubrics::Table, Rubrics::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_rubric_id")
                    .table(Items::Table)
                    .col(Items::RubricId)
                    .to_owned(),
            )
            .await?;

        // Item statuses: lifecycle tags referenced by planned items
        manager
            .create_table(
                Table::create()
                    .table(ItemStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemStatuses::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemStatuses::DesignationAr).string().null())
                    .col(ColumnDef::new(ItemStatuses::DesignationEn).string().null())
                    .col(
                        ColumnDef::new(ItemStatuses::DesignationFr)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemStatuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemStatuses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_statuses_designation_fr")
                    .table(ItemStatuses::Table)
                    .col(ItemStatuses::DesignationFr)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rubrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Domains {
    Table,
    Id,
    DesignationAr,
    DesignationEn,
    DesignationFr,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Rubrics {
    Table,
    Id,
    DesignationAr,
    DesignationEn,
    DesignationFr,
    DomainId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Items {
    Table,
    Id,
    DesignationAr,
    DesignationEn,
    DesignationFr,
    RubricId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum ItemStatuses {
    Table,
    Id,
    DesignationAr,
    DesignationEn,
    DesignationFr,
    CreatedAt,
    UpdatedAt,
}
