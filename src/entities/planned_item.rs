use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A planned expenditure line: a quantity of a catalog item at a unit cost,
/// with a budget allocation. Only the three base numeric fields are stored;
/// total cost, variance, utilization and every classification are derived
/// on read so that repeated reads can never drift.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "planned_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Designation is required"))]
    pub designation: String,

    pub unit_cost: Decimal,
    pub planned_quantity: Decimal,
    pub allocated_amount: Decimal,

    pub item_status_id: Uuid,
    pub item_id: Uuid,
    pub financial_operation_id: Uuid,
    pub budget_modification_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::item_status::Entity",
        from = "Column::ItemStatusId",
        to = "super::item_status::Column::Id"
    )]
    ItemStatus,
    #[sea_orm(
        belongs_to = "super::financial_operation::Entity",
        from = "Column::FinancialOperationId",
        to = "super::financial_operation::Column::Id"
    )]
    FinancialOperation,
    #[sea_orm(
        belongs_to = "super::budget_modification::Entity",
        from = "Column::BudgetModificationId",
        to = "super::budget_modification::Column::Id"
    )]
    BudgetModification,
    #[sea_orm(has_many = "super::item_distribution::Entity")]
    ItemDistributions,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::item_distribution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemDistributions.def()
    }
}

impl Related<super::item_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemStatus.def()
    }
}

impl Related<super::financial_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialOperation.def()
    }
}

impl Related<super::budget_modification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetModification.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active = self;
        // Normalize surrounding whitespace before the row is persisted.
        let trimmed = match &active.designation {
            ActiveValue::Set(designation) => {
                let trimmed = designation.trim();
                (trimmed != designation.as_str()).then(|| trimmed.to_string())
            }
            _ => None,
        };
        if let Some(designation) = trimmed {
            active.designation = ActiveValue::Set(designation);
        }
        Ok(active)
    }
}

/// Tolerance band for the well-budgeted classification: a line is well
/// budgeted while |variance| stays within 10% of the allocated amount.
pub const WELL_BUDGETED_TOLERANCE: Decimal = dec!(0.10);

const COST_LOW_MAX: Decimal = dec!(100);
const COST_MEDIUM_MAX: Decimal = dec!(1000);
const COST_HIGH_MAX: Decimal = dec!(10000);

const QUANTITY_SMALL_MAX: Decimal = dec!(10);
const QUANTITY_MEDIUM_MAX: Decimal = dec!(100);
const QUANTITY_LARGE_MAX: Decimal = dec!(1000);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetCategory {
    OverBudget,
    UnderBudget,
    WellBudgeted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CostCategory {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QuantityScale {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl Model {
    /// unit_cost × planned_quantity, recomputed on every read.
    pub fn total_cost(&self) -> Decimal {
        self.unit_cost * self.planned_quantity
    }

    /// Signed gap between the computed cost and the allocation.
    /// Positive means the plan costs more than what was allocated.
    pub fn variance(&self) -> Decimal {
        self.total_cost() - self.allocated_amount
    }

    /// total_cost / allocated_amount. `None` when nothing is allocated —
    /// the ratio is not applicable, never a division fault.
    pub fn utilization(&self) -> Option<Decimal> {
        if self.allocated_amount.is_zero() {
            None
        } else {
            Some(self.total_cost() / self.allocated_amount)
        }
    }

    pub fn budget_category(&self) -> BudgetCategory {
        let variance = self.variance();
        if variance.abs() <= WELL_BUDGETED_TOLERANCE * self.allocated_amount {
            BudgetCategory::WellBudgeted
        } else if variance > Decimal::ZERO {
            BudgetCategory::OverBudget
        } else {
            BudgetCategory::UnderBudget
        }
    }

    pub fn cost_category(&self) -> CostCategory {
        if self.unit_cost <= COST_LOW_MAX {
            CostCategory::Low
        } else if self.unit_cost <= COST_MEDIUM_MAX {
            CostCategory::Medium
        } else if self.unit_cost <= COST_HIGH_MAX {
            CostCategory::High
        } else {
            CostCategory::VeryHigh
        }
    }

    pub fn quantity_scale(&self) -> QuantityScale {
        if self.planned_quantity <= QUANTITY_SMALL_MAX {
            QuantityScale::Small
        } else if self.planned_quantity <= QUANTITY_MEDIUM_MAX {
            QuantityScale::Medium
        } else if self.planned_quantity <= QUANTITY_LARGE_MAX {
            QuantityScale::Large
        } else {
            QuantityScale::VeryLarge
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn line(unit_cost: Decimal, planned_quantity: Decimal, allocated_amount: Decimal) -> Model {
        Model {
            id: Uuid::new_v4(),
            designation: "test line".to_string(),
            unit_cost,
            planned_quantity,
            allocated_amount,
            item_status_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            financial_operation_id: Uuid::new_v4(),
            budget_modification_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn total_cost_is_product_of_base_fields() {
        let p = line(dec!(12.50), dec!(4), dec!(50));
        assert_eq!(p.total_cost(), dec!(50.00));
        // Repeated reads return the identical value; nothing is cached.
        assert_eq!(p.total_cost(), p.total_cost());
    }

    #[test]
    fn boundary_case_from_planning_review() {
        // unit_cost=1000, qty=12, allocated=11000: variance is exactly
        // +1000, inside the 10% band (1100), so the line is well budgeted
        // even though it overshoots the allocation in absolute terms.
        let p = line(dec!(1000), dec!(12), dec!(11000));
        assert_eq!(p.total_cost(), dec!(12000));
        assert_eq!(p.variance(), dec!(1000));
        assert_eq!(p.budget_category(), BudgetCategory::WellBudgeted);

        let utilization = p.utilization().expect("allocation is non-zero");
        assert!(utilization > dec!(1.09) && utilization < dec!(1.10));
    }

    #[test]
    fn just_past_the_tolerance_band_is_over_budget() {
        // variance 1101 > 10% of 11000
        let p = line(dec!(1000), dec!(12.101), dec!(11000));
        assert_eq!(p.budget_category(), BudgetCategory::OverBudget);
    }

    #[test]
    fn under_allocation_past_the_band_is_under_budget() {
        let p = line(dec!(100), dec!(5), dec!(1000));
        assert_eq!(p.variance(), dec!(-500));
        assert_eq!(p.budget_category(), BudgetCategory::UnderBudget);
    }

    #[test]
    fn utilization_is_not_applicable_without_allocation() {
        let p = line(dec!(500), dec!(3), Decimal::ZERO);
        assert_eq!(p.utilization(), None);
    }

    #[rstest]
    #[case(dec!(0), CostCategory::Low)]
    #[case(dec!(100), CostCategory::Low)]
    #[case(dec!(100.01), CostCategory::Medium)]
    #[case(dec!(1000), CostCategory::Medium)]
    #[case(dec!(1000.01), CostCategory::High)]
    #[case(dec!(10000), CostCategory::High)]
    #[case(dec!(10000.01), CostCategory::VeryHigh)]
    fn cost_category_breakpoints(#[case] unit_cost: Decimal, #[case] expected: CostCategory) {
        assert_eq!(line(unit_cost, dec!(1), dec!(1)).cost_category(), expected);
    }

    #[rstest]
    #[case(dec!(10), QuantityScale::Small)]
    #[case(dec!(11), QuantityScale::Medium)]
    #[case(dec!(100), QuantityScale::Medium)]
    #[case(dec!(101), QuantityScale::Large)]
    #[case(dec!(1000), QuantityScale::Large)]
    #[case(dec!(1001), QuantityScale::VeryLarge)]
    fn quantity_scale_breakpoints(#[case] quantity: Decimal, #[case] expected: QuantityScale) {
        assert_eq!(line(dec!(1), quantity, dec!(1)).quantity_scale(), expected);
    }
}
