mod common;

use assert_matches::assert_matches;
use budget_planning_api::{
    entities::planned_item::BudgetCategory,
    errors::ServiceError,
    services::distributions::AllocateDistributionRequest,
    services::planned_items::{CreatePlannedItemRequest, UpdatePlannedItemRequest},
};
use common::{seed_catalog, seed_financial_operation, seed_planned_item, seed_structure, TestCtx};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn derived_metrics_on_the_boundary_scenario() {
    let ctx = TestCtx::new().await;

    let created = seed_planned_item(&ctx, "boundary", dec!(1000), dec!(12), dec!(11000)).await;

    assert_eq!(created.total_cost, dec!(12000));
    assert_eq!(created.variance, dec!(1000));
    // variance 1000 <= 10% of 11000 (= 1100): inside the band.
    assert_eq!(created.budget_category, BudgetCategory::WellBudgeted);

    let utilization = created.utilization.expect("allocation is non-zero");
    assert!(utilization > dec!(1.09) && utilization < dec!(1.10));

    // Re-read: derived values are recomputed, not cached, and identical.
    let reread = ctx
        .services
        .planned_items
        .get(created.id)
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(reread.total_cost, created.total_cost);
    assert_eq!(reread.variance, created.variance);
    assert_eq!(reread.budget_category, created.budget_category);
}

#[tokio::test]
async fn zero_allocation_yields_not_applicable_utilization() {
    let ctx = TestCtx::new().await;

    let created = seed_planned_item(&ctx, "zero-alloc", dec!(500), dec!(3), Decimal::ZERO).await;
    assert_eq!(created.utilization, None);
}

#[tokio::test]
async fn negative_numeric_fields_are_rejected() {
    let ctx = TestCtx::new().await;
    let (_, _, item_id, status_id) = seed_catalog(&ctx, "neg").await;
    let operation_id = seed_financial_operation(&ctx, "neg").await;

    let result = ctx
        .services
        .planned_items
        .create(CreatePlannedItemRequest {
            designation: "negative cost".to_string(),
            unit_cost: dec!(-1),
            planned_quantity: dec!(5),
            allocated_amount: dec!(100),
            item_id,
            financial_operation_id: operation_id,
            item_status_id: status_id,
        })
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn unresolved_references_are_reported_as_such() {
    let ctx = TestCtx::new().await;
    let (_, _, item_id, status_id) = seed_catalog(&ctx, "refs").await;
    let operation_id = seed_financial_operation(&ctx, "refs").await;

    let result = ctx
        .services
        .planned_items
        .create(CreatePlannedItemRequest {
            designation: "dangling item".to_string(),
            unit_cost: dec!(10),
            planned_quantity: dec!(1),
            allocated_amount: dec!(10),
            item_id: Uuid::new_v4(),
            financial_operation_id: operation_id,
            item_status_id: status_id,
        })
        .await;
    assert_matches!(result, Err(ServiceError::ReferenceNotFound(_)));

    // A good create with the real item still works.
    let ok = ctx
        .services
        .planned_items
        .create(CreatePlannedItemRequest {
            designation: "resolves".to_string(),
            unit_cost: dec!(10),
            planned_quantity: dec!(1),
            allocated_amount: dec!(10),
            item_id,
            financial_operation_id: operation_id,
            item_status_id: status_id,
        })
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn update_of_missing_id_is_not_found() {
    let ctx = TestCtx::new().await;

    let result = ctx
        .services
        .planned_items
        .update(
            Uuid::new_v4(),
            UpdatePlannedItemRequest {
                designation: None,
                unit_cost: Some(dec!(5)),
                planned_quantity: None,
                allocated_amount: None,
                item_status_id: None,
                budget_modification_id: None,
            },
        )
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn delete_is_blocked_while_distributions_exist() {
    let ctx = TestCtx::new().await;

    let planned = seed_planned_item(&ctx, "guarded", dec!(100), dec!(10), dec!(1000)).await;
    let structure_id = seed_structure(&ctx, "Direction A", None).await;

    ctx.services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: planned.id,
            structure_id,
            quantity: dec!(4),
        })
        .await
        .expect("allocate");

    let blocked = ctx.services.planned_items.delete(planned.id).await;
    assert_matches!(blocked, Err(ServiceError::Conflict(_)));

    // Removing the distribution unblocks deletion.
    let rows = ctx
        .services
        .distributions
        .list_by_planned_item(planned.id)
        .await
        .unwrap();
    for row in rows {
        ctx.services.distributions.delete(row.id).await.unwrap();
    }

    ctx.services
        .planned_items
        .delete(planned.id)
        .await
        .expect("delete after cleanup");
    assert!(ctx
        .services
        .planned_items
        .get(planned.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn ledger_statistics_are_recomputed_from_rows() {
    let ctx = TestCtx::new().await;

    // Empty ledger: zeros, not an error.
    let empty = ctx.services.planned_items.statistics().await.unwrap();
    assert_eq!(empty.planned_item_count, 0);
    assert_eq!(empty.total_cost, Decimal::ZERO);

    seed_planned_item(&ctx, "stats-a", dec!(100), dec!(10), dec!(900)).await;
    let second = seed_planned_item(&ctx, "stats-b", dec!(300), dec!(2), dec!(700)).await;

    let stats = ctx.services.planned_items.statistics().await.unwrap();
    assert_eq!(stats.planned_item_count, 2);
    assert_eq!(stats.total_allocated, dec!(1600));
    assert_eq!(stats.total_cost, dec!(1600)); // 1000 + 600
    assert_eq!(stats.average_unit_cost, dec!(200));
    assert_eq!(stats.average_planned_quantity, dec!(6));
    assert_eq!(stats.max_unit_cost, dec!(300));
    assert_eq!(stats.max_allocated_amount, dec!(900));

    // Deleting a row shifts every aggregate on the next call.
    ctx.services
        .planned_items
        .delete(second.id)
        .await
        .expect("delete");
    let after = ctx.services.planned_items.statistics().await.unwrap();
    assert_eq!(after.planned_item_count, 1);
    assert_eq!(after.total_cost, dec!(1000));
}

#[tokio::test]
async fn budget_category_filter_classifies_at_read_time() {
    let ctx = TestCtx::new().await;

    // 100 * 10 = 1000 against 900 allocated: variance 100 > 90, over.
    let over = seed_planned_item(&ctx, "cat-over", dec!(100), dec!(10), dec!(900)).await;
    // 100 * 10 = 1000 against 1000: variance 0, well budgeted.
    let well = seed_planned_item(&ctx, "cat-well", dec!(100), dec!(10), dec!(1000)).await;

    let over_rows = ctx
        .services
        .planned_items
        .list_by_budget_category(BudgetCategory::OverBudget)
        .await
        .unwrap();
    assert!(over_rows.iter().any(|row| row.id == over.id));
    assert!(!over_rows.iter().any(|row| row.id == well.id));

    let well_rows = ctx
        .services
        .planned_items
        .list_by_budget_category(BudgetCategory::WellBudgeted)
        .await
        .unwrap();
    assert!(well_rows.iter().any(|row| row.id == well.id));
}
