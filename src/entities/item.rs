use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Leaf of the classification hierarchy; planned items reference it.
/// Item designations are not unique, unlike domains and rubrics.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,

    #[validate(length(min = 1, message = "French designation is required"))]
    pub designation_fr: String,

    pub rubric_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rubric::Entity",
        from = "Column::RubricId",
        to = "super::rubric::Column::Id"
    )]
    Rubric,
    #[sea_orm(has_many = "super::planned_item::Entity")]
    PlannedItems,
}

impl Related<super::rubric::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rubric.def()
    }
}

impl Related<super::planned_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
