use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// Assignment of part of a planned item's quantity to one organizational
/// structure. Several rows may exist for the same (planned item, structure)
/// pair; rebalancing recreates rows rather than mutating in place.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_distributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub quantity: Decimal,
    pub planned_item_id: Uuid,
    pub structure_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::planned_item::Entity",
        from = "Column::PlannedItemId",
        to = "super::planned_item::Column::Id"
    )]
    PlannedItem,
    #[sea_orm(
        belongs_to = "super::structure::Entity",
        from = "Column::StructureId",
        to = "super::structure::Column::Id"
    )]
    Structure,
}

impl Related<super::planned_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedItem.def()
    }
}

impl Related<super::structure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Structure.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// How a single distribution relates to its parent's planned quantity.
/// Over-allocation is reported, never blocked at write time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionCoverage {
    Complete,
    Partial,
    OverAllocated,
}

impl Model {
    pub fn coverage(&self, planned_quantity: Decimal) -> DistributionCoverage {
        if self.quantity == planned_quantity {
            DistributionCoverage::Complete
        } else if self.quantity < planned_quantity {
            DistributionCoverage::Partial
        } else {
            DistributionCoverage::OverAllocated
        }
    }

    /// Cost attribution follows unit cost, not the allocated amount; the
    /// two denominators are deliberately distinct.
    pub fn distributed_cost(&self, unit_cost: Decimal) -> Decimal {
        self.quantity * unit_cost
    }

    /// Share of the parent's planned quantity covered by this row.
    /// `None` when the plan quantity is zero.
    pub fn percent_of_plan(&self, planned_quantity: Decimal) -> Option<Decimal> {
        if planned_quantity.is_zero() {
            None
        } else {
            Some(self.quantity / planned_quantity * Decimal::ONE_HUNDRED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(quantity: Decimal) -> Model {
        Model {
            id: Uuid::new_v4(),
            quantity,
            planned_item_id: Uuid::new_v4(),
            structure_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn coverage_against_planned_quantity() {
        assert_eq!(
            row(dec!(10)).coverage(dec!(10)),
            DistributionCoverage::Complete
        );
        assert_eq!(
            row(dec!(4)).coverage(dec!(10)),
            DistributionCoverage::Partial
        );
        assert_eq!(
            row(dec!(12)).coverage(dec!(10)),
            DistributionCoverage::OverAllocated
        );
    }

    #[test]
    fn distributed_cost_uses_unit_cost_denominator() {
        assert_eq!(row(dec!(7)).distributed_cost(dec!(1000)), dec!(7000));
    }

    #[test]
    fn percent_of_plan_guards_zero_quantity_plans() {
        assert_eq!(row(dec!(3)).percent_of_plan(Decimal::ZERO), None);
        assert_eq!(row(dec!(3)).percent_of_plan(dec!(12)), Some(dec!(25)));
    }
}
