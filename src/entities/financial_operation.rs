use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A named operation tied to a budget year and budget type; planned items
/// execute against it. The operation name is unique across all years.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "financial_operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Operation name is required"))]
    pub operation: String,

    pub budget_year: i32,
    pub budget_type_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_type::Entity",
        from = "Column::BudgetTypeId",
        to = "super::budget_type::Column::Id"
    )]
    BudgetType,
    #[sea_orm(has_many = "super::planned_item::Entity")]
    PlannedItems,
}

impl Related<super::budget_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetType.def()
    }
}

impl Related<super::planned_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
