mod common;

use assert_matches::assert_matches;
use budget_planning_api::{
    classification::ItemNature,
    errors::ServiceError,
    services::catalog::{CreateDomainRequest, CreateItemRequest, CreateRubricRequest},
};
use common::{seed_catalog, TestCtx};
use uuid::Uuid;

#[tokio::test]
async fn domain_delete_is_blocked_until_children_are_gone() {
    let ctx = TestCtx::new().await;
    let (domain_id, rubric_id, item_id, _) = seed_catalog(&ctx, "guard").await;

    let blocked = ctx.services.domains.delete(domain_id).await;
    assert_matches!(blocked, Err(ServiceError::Conflict(_)));

    // The rubric is itself guarded by its item.
    let rubric_blocked = ctx.services.rubrics.delete(rubric_id).await;
    assert_matches!(rubric_blocked, Err(ServiceError::Conflict(_)));

    // Tear down leaf-first, then deletes go through.
    ctx.services.items.delete(item_id).await.expect("item");
    ctx.services.rubrics.delete(rubric_id).await.expect("rubric");
    ctx.services.domains.delete(domain_id).await.expect("domain");

    assert!(ctx.services.domains.get(domain_id).await.unwrap().is_none());
}

#[tokio::test]
async fn designation_uniqueness_is_enforced_per_level() {
    let ctx = TestCtx::new().await;
    let (domain_id, _, _, _) = seed_catalog(&ctx, "uniq").await;

    let duplicate_domain = ctx
        .services
        .domains
        .create(CreateDomainRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: "Domaine uniq".to_string(),
        })
        .await;
    assert_matches!(duplicate_domain, Err(ServiceError::UniquenessViolation(_)));

    let duplicate_rubric = ctx
        .services
        .rubrics
        .create(CreateRubricRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: "Rubrique uniq".to_string(),
            domain_id,
        })
        .await;
    assert_matches!(duplicate_rubric, Err(ServiceError::UniquenessViolation(_)));

    // Item designations are not unique: a second item with the same name
    // under the same rubric is accepted.
    let (_, rubric2, _, _) = seed_catalog(&ctx, "uniq2").await;
    let twin = ctx
        .services
        .items
        .create(CreateItemRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: "Article uniq".to_string(),
            rubric_id: rubric2,
        })
        .await;
    assert!(twin.is_ok());
}

#[tokio::test]
async fn rubric_creation_requires_an_existing_domain() {
    let ctx = TestCtx::new().await;

    let orphan = ctx
        .services
        .rubrics
        .create(CreateRubricRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: "Rubrique orpheline".to_string(),
            domain_id: Uuid::new_v4(),
        })
        .await;

    assert_matches!(orphan, Err(ServiceError::ReferenceNotFound(_)));
}

#[tokio::test]
async fn update_of_missing_domain_is_not_found() {
    let ctx = TestCtx::new().await;

    let result = ctx
        .services
        .domains
        .update(
            Uuid::new_v4(),
            budget_planning_api::services::catalog::UpdateDomainRequest {
                designation_ar: None,
                designation_en: None,
                designation_fr: Some("Renomme".to_string()),
            },
        )
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn item_responses_carry_the_heuristic_nature_label() {
    let ctx = TestCtx::new().await;
    let (_, rubric_id, _, _) = seed_catalog(&ctx, "nature").await;

    let equipment = ctx
        .services
        .items
        .create(CreateItemRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: "Ordinateur de bureau".to_string(),
            rubric_id,
        })
        .await
        .unwrap();
    assert_eq!(equipment.nature, ItemNature::Equipment);

    let unknown = ctx
        .services
        .items
        .create(CreateItemRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: "Divers".to_string(),
            rubric_id,
        })
        .await
        .unwrap();
    assert_eq!(unknown.nature, ItemNature::Other);
}
