//! Property checks for the derived financial metrics. These run on the
//! pure model functions; no database is involved.

use budget_planning_api::entities::planned_item::{
    BudgetCategory, Model as PlannedItem, WELL_BUDGETED_TOLERANCE,
};
use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

fn planned_item(
    unit_cost: Decimal,
    planned_quantity: Decimal,
    allocated_amount: Decimal,
) -> PlannedItem {
    PlannedItem {
        id: Uuid::nil(),
        designation: "prop".to_string(),
        unit_cost,
        planned_quantity,
        allocated_amount,
        item_status_id: Uuid::nil(),
        item_id: Uuid::nil(),
        financial_operation_id: Uuid::nil(),
        budget_modification_id: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// Bounded decimals with up to two fractional digits, the shape real
/// monetary and quantity inputs take.
fn money() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #[test]
    fn total_cost_is_exactly_the_product(unit_cost in money(), quantity in money()) {
        let p = planned_item(unit_cost, quantity, Decimal::ONE);
        prop_assert_eq!(p.total_cost(), unit_cost * quantity);
        // Reading twice yields the identical value.
        prop_assert_eq!(p.total_cost(), p.total_cost());
    }

    #[test]
    fn variance_is_total_cost_minus_allocation(
        unit_cost in money(),
        quantity in money(),
        allocated in money(),
    ) {
        let p = planned_item(unit_cost, quantity, allocated);
        prop_assert_eq!(p.variance(), p.total_cost() - allocated);
    }

    #[test]
    fn well_budgeted_iff_variance_within_tolerance(
        unit_cost in money(),
        quantity in money(),
        allocated in money(),
    ) {
        prop_assume!(allocated > Decimal::ZERO);
        let p = planned_item(unit_cost, quantity, allocated);

        let within = p.variance().abs() <= WELL_BUDGETED_TOLERANCE * allocated;
        prop_assert_eq!(
            p.budget_category() == BudgetCategory::WellBudgeted,
            within
        );

        // Outside the band the sign of the variance picks the side.
        if !within {
            if p.variance() > Decimal::ZERO {
                prop_assert_eq!(p.budget_category(), BudgetCategory::OverBudget);
            } else {
                prop_assert_eq!(p.budget_category(), BudgetCategory::UnderBudget);
            }
        }
    }

    #[test]
    fn utilization_is_defined_exactly_when_allocated(
        unit_cost in money(),
        quantity in money(),
        allocated in money(),
    ) {
        let p = planned_item(unit_cost, quantity, allocated);
        prop_assert_eq!(p.utilization().is_none(), allocated.is_zero());

        if let Some(ratio) = p.utilization() {
            // Division rounds at Decimal's 28-digit precision, so compare
            // the round-trip within a tight band rather than exactly.
            let round_trip = ratio * allocated;
            let epsilon = Decimal::new(1, 12);
            prop_assert!((round_trip - p.total_cost()).abs() <= epsilon * p.total_cost().max(Decimal::ONE));
        }
    }
}
