use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Small referenced vocabulary (operating, investment, ...). Lookup only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub designation_fr: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::financial_operation::Entity")]
    FinancialOperations,
}

impl Related<super::financial_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialOperations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
