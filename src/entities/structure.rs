use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organizational unit receiving distributed quantities. Structures form a
/// tree through parent_structure_id; the allocator walks descendants for
/// ancestor-scoped listings.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "structures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub parent_structure_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentStructureId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::item_distribution::Entity")]
    ItemDistributions,
}

impl Related<super::item_distribution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemDistributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
