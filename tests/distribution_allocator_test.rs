mod common;

use assert_matches::assert_matches;
use budget_planning_api::{
    entities::item_distribution::DistributionCoverage,
    errors::ServiceError,
    services::distributions::{AllocateDistributionRequest, CoordinationStatus},
};
use common::{seed_planned_item, seed_structure, TestCtx};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn over_distribution_is_reported_but_never_blocked() {
    let ctx = TestCtx::new().await;

    let planned = seed_planned_item(&ctx, "overdist", dec!(1000), dec!(10), dec!(10000)).await;
    let north = seed_structure(&ctx, "Direction Nord", None).await;
    let south = seed_structure(&ctx, "Direction Sud", None).await;

    // 7 + 5 = 12 > 10: both writes succeed.
    for (structure_id, quantity) in [(north, dec!(7)), (south, dec!(5))] {
        ctx.services
            .distributions
            .allocate(AllocateDistributionRequest {
                planned_item_id: planned.id,
                structure_id,
                quantity,
            })
            .await
            .expect("allocate persists despite the overflow");
    }

    let rows = ctx
        .services
        .distributions
        .list_by_planned_item(planned.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let report = ctx
        .services
        .distributions
        .over_distribution_report()
        .await
        .unwrap();
    let entry = report
        .iter()
        .find(|entry| entry.planned_item_id == planned.id)
        .expect("planned item flagged");
    assert_eq!(entry.distributed_quantity, dec!(12));
    assert_eq!(entry.excess, dec!(2));
}

#[tokio::test]
async fn duplicate_allocations_create_distinct_rows() {
    let ctx = TestCtx::new().await;

    let planned = seed_planned_item(&ctx, "dup", dec!(50), dec!(20), dec!(1000)).await;
    let structure_id = seed_structure(&ctx, "Direction Est", None).await;

    let request = || AllocateDistributionRequest {
        planned_item_id: planned.id,
        structure_id,
        quantity: dec!(5),
    };

    let first = ctx.services.distributions.allocate(request()).await.unwrap();
    let second = ctx.services.distributions.allocate(request()).await.unwrap();
    assert_ne!(first.id, second.id);

    let rows = ctx
        .services
        .distributions
        .list_by_planned_item(planned.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn coverage_and_cost_attribution_per_distribution() {
    let ctx = TestCtx::new().await;

    let planned = seed_planned_item(&ctx, "coverage", dec!(1000), dec!(10), dec!(9000)).await;
    let structure_id = seed_structure(&ctx, "Direction Ouest", None).await;

    let partial = ctx
        .services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: planned.id,
            structure_id,
            quantity: dec!(4),
        })
        .await
        .unwrap();

    assert_eq!(partial.coverage, DistributionCoverage::Partial);
    // Cost follows unit cost (4 × 1000), not the allocated amount.
    assert_eq!(partial.distributed_cost, dec!(4000));
    assert_eq!(partial.percent_of_plan, Some(dec!(40)));

    let complete = ctx
        .services
        .distributions
        .update(
            partial.id,
            budget_planning_api::services::distributions::UpdateDistributionRequest {
                quantity: dec!(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(complete.coverage, DistributionCoverage::Complete);

    let over = ctx
        .services
        .distributions
        .update(
            partial.id,
            budget_planning_api::services::distributions::UpdateDistributionRequest {
                quantity: dec!(12),
            },
        )
        .await
        .unwrap();
    assert_eq!(over.coverage, DistributionCoverage::OverAllocated);
}

#[tokio::test]
async fn zero_quantity_plan_reports_not_applicable_share() {
    let ctx = TestCtx::new().await;

    let planned = seed_planned_item(&ctx, "zeroplan", dec!(100), Decimal::ZERO, dec!(0)).await;
    let structure_id = seed_structure(&ctx, "Direction Zero", None).await;

    let row = ctx
        .services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: planned.id,
            structure_id,
            quantity: dec!(3),
        })
        .await
        .unwrap();

    assert_eq!(row.percent_of_plan, None);
    assert_eq!(row.coverage, DistributionCoverage::OverAllocated);
}

#[tokio::test]
async fn allocate_validates_quantity_and_references() {
    let ctx = TestCtx::new().await;

    let planned = seed_planned_item(&ctx, "validate", dec!(10), dec!(10), dec!(100)).await;
    let structure_id = seed_structure(&ctx, "Direction V", None).await;

    let negative = ctx
        .services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: planned.id,
            structure_id,
            quantity: dec!(-1),
        })
        .await;
    assert_matches!(negative, Err(ServiceError::ValidationError(_)));

    let missing_parent = ctx
        .services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: Uuid::new_v4(),
            structure_id,
            quantity: dec!(1),
        })
        .await;
    assert_matches!(missing_parent, Err(ServiceError::ReferenceNotFound(_)));

    let missing_structure = ctx
        .services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: planned.id,
            structure_id: Uuid::new_v4(),
            quantity: dec!(1),
        })
        .await;
    assert_matches!(missing_structure, Err(ServiceError::ReferenceNotFound(_)));
}

#[tokio::test]
async fn opt_in_cap_rejects_overflow_at_write_time() {
    let ctx = TestCtx::with_distribution_cap(true).await;

    let planned = seed_planned_item(&ctx, "capped", dec!(10), dec!(10), dec!(100)).await;
    let structure_id = seed_structure(&ctx, "Direction Cap", None).await;

    ctx.services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: planned.id,
            structure_id,
            quantity: dec!(7),
        })
        .await
        .expect("within cap");

    let overflow = ctx
        .services
        .distributions
        .allocate(AllocateDistributionRequest {
            planned_item_id: planned.id,
            structure_id,
            quantity: dec!(5),
        })
        .await;
    assert_matches!(overflow, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn ancestor_listing_includes_the_whole_subtree() {
    let ctx = TestCtx::new().await;

    let planned = seed_planned_item(&ctx, "subtree", dec!(10), dec!(100), dec!(1000)).await;

    let root = seed_structure(&ctx, "Ministere", None).await;
    let child = seed_structure(&ctx, "Direction Regionale", Some(root)).await;
    let grandchild = seed_structure(&ctx, "Bureau Local", Some(child)).await;
    let unrelated = seed_structure(&ctx, "Autre Ministere", None).await;

    for structure_id in [child, grandchild, unrelated] {
        ctx.services
            .distributions
            .allocate(AllocateDistributionRequest {
                planned_item_id: planned.id,
                structure_id,
                quantity: dec!(5),
            })
            .await
            .unwrap();
    }

    let scoped = ctx
        .services
        .distributions
        .list_by_organizational_ancestor(root)
        .await
        .unwrap();
    assert_eq!(scoped.len(), 2);
    assert!(scoped
        .iter()
        .all(|row| row.structure_id == child || row.structure_id == grandchild));

    // Direct listing stays single-level.
    let direct = ctx
        .services
        .distributions
        .list_by_structure(child)
        .await
        .unwrap();
    assert_eq!(direct.len(), 1);
}

#[tokio::test]
async fn coordination_report_flags_shared_planned_items() {
    let ctx = TestCtx::new().await;

    let shared = seed_planned_item(&ctx, "shared", dec!(10), dec!(10), dec!(100)).await;
    let single = seed_planned_item(&ctx, "single", dec!(10), dec!(10), dec!(100)).await;

    let a = seed_structure(&ctx, "Structure A", None).await;
    let b = seed_structure(&ctx, "Structure B", None).await;

    for (planned_item_id, structure_id) in [(shared.id, a), (shared.id, b), (single.id, a)] {
        ctx.services
            .distributions
            .allocate(AllocateDistributionRequest {
                planned_item_id,
                structure_id,
                quantity: dec!(5),
            })
            .await
            .unwrap();
    }

    let report = ctx
        .services
        .distributions
        .coordination_report()
        .await
        .unwrap();

    let shared_entry = report
        .iter()
        .find(|entry| entry.planned_item_id == shared.id)
        .expect("shared entry");
    assert_eq!(shared_entry.status, CoordinationStatus::RequiresCoordination);
    assert_eq!(shared_entry.distribution_count, 2);

    let single_entry = report
        .iter()
        .find(|entry| entry.planned_item_id == single.id)
        .expect("single entry");
    assert_eq!(single_entry.status, CoordinationStatus::SingleDistribution);
}

#[tokio::test]
async fn structure_summary_aggregates_quantity_and_cost() {
    let ctx = TestCtx::new().await;

    let cheap = seed_planned_item(&ctx, "cheap", dec!(10), dec!(100), dec!(1000)).await;
    let pricey = seed_planned_item(&ctx, "pricey", dec!(1000), dec!(10), dec!(10000)).await;
    let target = seed_structure(&ctx, "Direction Cible", None).await;

    for (planned_item_id, quantity) in [(cheap.id, dec!(20)), (pricey.id, dec!(3))] {
        ctx.services
            .distributions
            .allocate(AllocateDistributionRequest {
                planned_item_id,
                structure_id: target,
                quantity,
            })
            .await
            .unwrap();
    }

    let summary = ctx
        .services
        .distributions
        .structure_summary()
        .await
        .unwrap();
    let entry = summary
        .iter()
        .find(|entry| entry.structure_id == target)
        .expect("structure present");

    assert_eq!(entry.distribution_count, 2);
    assert_eq!(entry.total_quantity, dec!(23));
    // 20 × 10 + 3 × 1000
    assert_eq!(entry.total_cost, dec!(3200));
    assert_eq!(entry.structure_name, "Direction Cible");
}
