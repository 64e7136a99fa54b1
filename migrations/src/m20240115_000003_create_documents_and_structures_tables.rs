use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Documents back budget modifications (demande / response records).
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Documents::Reference).string().not_null())
                    .col(ColumnDef::new(Documents::Title).string().null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Organizational structures form a tree via parent_structure_id.
        manager
            .create_table(
                Table::create()
                    .table(Structures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Structures::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Structures::Name).string().not_null())
                    .col(
                        ColumnDef::new(Structures::ParentStructureId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Structures::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Structures::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_structures_parent")
                            .from(Structures::Table, Structures::ParentStructureId)
                            .to(Structures::Table, Structures::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_structures_parent_structure_id")
                    .table(Structures::Table)
                    .col(Structures::ParentStructureId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Structures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Documents {
    Table,
    Id,
    Reference,
    Title,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Structures {
    Table,
    Id,
    Name,
    ParentStructureId,
    CreatedAt,
    UpdatedAt,
}
