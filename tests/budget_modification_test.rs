mod common;

use assert_matches::assert_matches;
use budget_planning_api::{
    entities::budget_modification::ApprovalState,
    errors::ServiceError,
    services::budget_modifications::UpdateBudgetModificationRequest,
};
use common::{date, modification_request, seed_document, TestCtx};
use uuid::Uuid;

#[tokio::test]
async fn approval_state_is_derived_against_a_pinned_date() {
    let ctx = TestCtx::new().await;
    let demande = seed_document(&ctx, "DEM-2024-001").await;
    let as_of = date(2024, 6, 15);

    // Pending: no approval date.
    let pending = ctx
        .services
        .budget_modifications
        .create(modification_request("virement", None, Some(demande)), as_of)
        .await
        .unwrap();
    assert_eq!(pending.approval_state, ApprovalState::Pending);

    // Setting a past date flips straight to approved.
    let approved = ctx
        .services
        .budget_modifications
        .update(
            pending.id,
            UpdateBudgetModificationRequest {
                object: None,
                description: None,
                approval_date: Some(date(2024, 3, 1)),
                clear_approval_date: false,
                response_id: None,
            },
            as_of,
        )
        .await
        .unwrap();
    assert_eq!(approved.approval_state, ApprovalState::Approved);

    // A future date is merely scheduled at the same as-of point...
    let scheduled = ctx
        .services
        .budget_modifications
        .update(
            pending.id,
            UpdateBudgetModificationRequest {
                object: None,
                description: None,
                approval_date: Some(date(2024, 9, 1)),
                clear_approval_date: false,
                response_id: None,
            },
            as_of,
        )
        .await
        .unwrap();
    assert_eq!(scheduled.approval_state, ApprovalState::Scheduled);

    // ...and becomes approved by clock advance alone, no write involved.
    let later = ctx
        .services
        .budget_modifications
        .get(pending.id, date(2024, 9, 1))
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(later.approval_state, ApprovalState::Approved);
}

#[tokio::test]
async fn missing_demande_is_a_validation_error() {
    let ctx = TestCtx::new().await;

    let result = ctx
        .services
        .budget_modifications
        .create(
            modification_request("sans demande", None, None),
            date(2024, 1, 1),
        )
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn unknown_documents_are_reference_errors() {
    let ctx = TestCtx::new().await;

    let result = ctx
        .services
        .budget_modifications
        .create(
            modification_request("dangling", None, Some(Uuid::new_v4())),
            date(2024, 1, 1),
        )
        .await;

    assert_matches!(result, Err(ServiceError::ReferenceNotFound(_)));
}

#[tokio::test]
async fn duplicate_approval_pair_is_rejected() {
    let ctx = TestCtx::new().await;
    let demande = seed_document(&ctx, "DEM-2024-002").await;
    let as_of = date(2024, 6, 1);
    let approval = date(2024, 5, 1);

    ctx.services
        .budget_modifications
        .create(
            modification_request("premier", Some(approval), Some(demande)),
            as_of,
        )
        .await
        .expect("first create");

    let duplicate = ctx
        .services
        .budget_modifications
        .create(
            modification_request("second", Some(approval), Some(demande)),
            as_of,
        )
        .await;
    assert_matches!(duplicate, Err(ServiceError::UniquenessViolation(_)));

    // A different date for the same demande is fine.
    let other_date = ctx
        .services
        .budget_modifications
        .create(
            modification_request("troisieme", Some(date(2024, 5, 2)), Some(demande)),
            as_of,
        )
        .await;
    assert!(other_date.is_ok());
}

#[tokio::test]
async fn pending_rows_never_collide_on_the_pair() {
    let ctx = TestCtx::new().await;
    let demande = seed_document(&ctx, "DEM-2024-003").await;
    let as_of = date(2024, 6, 1);

    // Two pending modifications for the same demande: NULL approval dates
    // do not participate in the compound uniqueness.
    for object in ["premier", "second"] {
        ctx.services
            .budget_modifications
            .create(modification_request(object, None, Some(demande)), as_of)
            .await
            .expect("pending rows are unconstrained");
    }
}

#[tokio::test]
async fn update_uniqueness_check_excludes_the_row_itself() {
    let ctx = TestCtx::new().await;
    let demande = seed_document(&ctx, "DEM-2024-004").await;
    let as_of = date(2024, 6, 1);
    let approval = date(2024, 4, 15);

    let created = ctx
        .services
        .budget_modifications
        .create(
            modification_request("self", Some(approval), Some(demande)),
            as_of,
        )
        .await
        .unwrap();

    // Re-asserting its own (date, demande) pair must not trip the check.
    let updated = ctx
        .services
        .budget_modifications
        .update(
            created.id,
            UpdateBudgetModificationRequest {
                object: Some("self, renamed".to_string()),
                description: None,
                approval_date: Some(approval),
                clear_approval_date: false,
                response_id: None,
            },
            as_of,
        )
        .await;
    assert!(updated.is_ok());
}

#[tokio::test]
async fn concurrent_duplicate_creates_resolve_to_exactly_one_winner() {
    let ctx = TestCtx::new().await;
    let demande = seed_document(&ctx, "DEM-2024-005").await;
    let as_of = date(2024, 6, 1);
    let approval = date(2024, 5, 20);

    let service_a = ctx.services.budget_modifications.clone();
    let service_b = ctx.services.budget_modifications.clone();

    let task_a = tokio::spawn(async move {
        service_a
            .create(
                modification_request("concurrent a", Some(approval), Some(demande)),
                as_of,
            )
            .await
    });
    let task_b = tokio::spawn(async move {
        service_b
            .create(
                modification_request("concurrent b", Some(approval), Some(demande)),
                as_of,
            )
            .await
    });

    let results = [task_a.await.unwrap(), task_b.await.unwrap()];
    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent create may win");

    // Whether it lost at the pre-check or at the unique index, the loser
    // sees the same taxonomy value.
    let loser = results
        .into_iter()
        .find(|result| result.is_err())
        .unwrap()
        .unwrap_err();
    assert_matches!(loser, ServiceError::UniquenessViolation(_));
}

#[tokio::test]
async fn bucketed_queries_filter_on_approval_date() {
    let ctx = TestCtx::new().await;
    let as_of = date(2024, 6, 15);

    for (idx, approval) in [
        None,
        Some(date(2024, 6, 1)),  // approved, within 30 days
        Some(date(2024, 1, 10)), // approved, current year
        Some(date(2023, 11, 5)), // approved, prior year
        Some(date(2024, 8, 1)),  // scheduled
    ]
    .into_iter()
    .enumerate()
    {
        let demande = seed_document(&ctx, &format!("DEM-BUCKET-{idx}")).await;
        ctx.services
            .budget_modifications
            .create(
                modification_request(&format!("bucket {idx}"), approval, Some(demande)),
                as_of,
            )
            .await
            .unwrap();
    }

    let service = &ctx.services.budget_modifications;

    assert_eq!(service.pending(as_of).await.unwrap().len(), 1);
    assert_eq!(service.scheduled(as_of).await.unwrap().len(), 1);
    assert_eq!(service.approved(as_of).await.unwrap().len(), 3);
    assert_eq!(
        service.approved_in_current_year(as_of).await.unwrap().len(),
        2
    );
    assert_eq!(service.approved_in_year(2023, as_of).await.unwrap().len(), 1);
    assert_eq!(
        service
            .approved_before(date(2024, 1, 1), as_of)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        service
            .approved_in_last_30_days(as_of)
            .await
            .unwrap()
            .len(),
        1
    );

    // The same rows classified at a later date move buckets with no write.
    let year_end = date(2024, 12, 31);
    assert_eq!(service.scheduled(year_end).await.unwrap().len(), 0);
    assert_eq!(service.approved(year_end).await.unwrap().len(), 4);
}

#[tokio::test]
async fn delete_is_blocked_while_a_planned_item_links_the_modification() {
    let ctx = TestCtx::new().await;
    let demande = seed_document(&ctx, "DEM-2024-006").await;
    let as_of = date(2024, 6, 1);

    let modification = ctx
        .services
        .budget_modifications
        .create(
            modification_request("linked", Some(date(2024, 5, 1)), Some(demande)),
            as_of,
        )
        .await
        .unwrap();

    let planned = common::seed_planned_item(
        &ctx,
        "linker",
        rust_decimal_macros::dec!(10),
        rust_decimal_macros::dec!(5),
        rust_decimal_macros::dec!(50),
    )
    .await;

    ctx.services
        .planned_items
        .update(
            planned.id,
            budget_planning_api::services::planned_items::UpdatePlannedItemRequest {
                designation: None,
                unit_cost: None,
                planned_quantity: None,
                allocated_amount: None,
                item_status_id: None,
                budget_modification_id: Some(modification.id),
            },
        )
        .await
        .expect("link modification");

    let blocked = ctx
        .services
        .budget_modifications
        .delete(modification.id)
        .await;
    assert_matches!(blocked, Err(ServiceError::Conflict(_)));

    ctx.services
        .planned_items
        .unlink_budget_modification(planned.id)
        .await
        .expect("unlink");
    ctx.services
        .budget_modifications
        .delete(modification.id)
        .await
        .expect("delete after unlink");
}
