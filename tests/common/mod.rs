#![allow(dead_code)]

use std::sync::Arc;

use budget_planning_api::{
    db::{self, DbConfig, DbPool},
    events::{process_events, EventSender},
    handlers::AppServices,
    services::budget_modifications::CreateBudgetModificationRequest,
    services::catalog::{
        CreateDomainRequest, CreateItemRequest, CreateItemStatusRequest, CreateRubricRequest,
    },
    services::documents::CreateDocumentRequest,
    services::financial_operations::{CreateBudgetTypeRequest, CreateFinancialOperationRequest},
    services::planned_items::CreatePlannedItemRequest,
    services::structures::CreateStructureRequest,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Test harness backed by a throwaway sqlite database with migrations
/// applied. A single pool connection keeps concurrent writers serialized
/// through the same path production uses.
pub struct TestCtx {
    pub services: AppServices,
    pub db: Arc<DbPool>,
    _tmp: tempfile::TempDir,
}

impl TestCtx {
    pub async fn new() -> Self {
        Self::with_distribution_cap(false).await
    }

    pub async fn with_distribution_cap(enforce: bool) -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let db_path = tmp.path().join("budget_planning_test.db");
        let config = DbConfig {
            url: format!("sqlite://{}?mode=rwc", db_path.display()),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&config)
            .await
            .expect("db connect");
        db::run_migrations(&pool).await.expect("migrations");

        let db_arc = Arc::new(pool);
        let (tx, rx) = mpsc::channel(256);
        let sender = EventSender::new(tx);
        tokio::spawn(process_events(rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(sender), enforce);

        Self {
            services,
            db: db_arc,
            _tmp: tmp,
        }
    }
}

/// Seeds the full catalog chain and returns (domain, rubric, item,
/// item status) ids. `label` keeps designations unique per call.
pub async fn seed_catalog(ctx: &TestCtx, label: &str) -> (Uuid, Uuid, Uuid, Uuid) {
    let domain = ctx
        .services
        .domains
        .create(CreateDomainRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: format!("Domaine {label}"),
        })
        .await
        .expect("seed domain");

    let rubric = ctx
        .services
        .rubrics
        .create(CreateRubricRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: format!("Rubrique {label}"),
            domain_id: domain.id,
        })
        .await
        .expect("seed rubric");

    let item = ctx
        .services
        .items
        .create(CreateItemRequest {
            designation_ar: None,
            designation_en: None,
            designation_fr: format!("Article {label}"),
            rubric_id: rubric.id,
        })
        .await
        .expect("seed item");

    let status = ctx
        .services
        .item_statuses
        .create(CreateItemStatusRequest {
            designation_ar: None,
            designation_en: Some("active".to_string()),
            designation_fr: format!("actif {label}"),
        })
        .await
        .expect("seed item status");

    (domain.id, rubric.id, item.id, status.id)
}

pub async fn seed_financial_operation(ctx: &TestCtx, label: &str) -> Uuid {
    let budget_type = ctx
        .services
        .budget_types
        .create(CreateBudgetTypeRequest {
            designation_fr: format!("Budget {label}"),
        })
        .await
        .expect("seed budget type");

    ctx.services
        .financial_operations
        .create(CreateFinancialOperationRequest {
            operation: format!("OP-{label}"),
            budget_year: 2024,
            budget_type_id: budget_type.id,
        })
        .await
        .expect("seed financial operation")
        .id
}

/// Seeds everything a planned item needs and creates it.
pub async fn seed_planned_item(
    ctx: &TestCtx,
    label: &str,
    unit_cost: Decimal,
    planned_quantity: Decimal,
    allocated_amount: Decimal,
) -> budget_planning_api::services::planned_items::PlannedItemResponse {
    let (_, _, item_id, status_id) = seed_catalog(ctx, label).await;
    let operation_id = seed_financial_operation(ctx, label).await;

    ctx.services
        .planned_items
        .create(CreatePlannedItemRequest {
            designation: format!("Ligne {label}"),
            unit_cost,
            planned_quantity,
            allocated_amount,
            item_id,
            financial_operation_id: operation_id,
            item_status_id: status_id,
        })
        .await
        .expect("seed planned item")
}

pub async fn seed_structure(ctx: &TestCtx, name: &str, parent: Option<Uuid>) -> Uuid {
    ctx.services
        .structures
        .create(CreateStructureRequest {
            name: name.to_string(),
            parent_structure_id: parent,
        })
        .await
        .expect("seed structure")
        .id
}

pub async fn seed_document(ctx: &TestCtx, reference: &str) -> Uuid {
    ctx.services
        .documents
        .create(CreateDocumentRequest {
            reference: reference.to_string(),
            title: None,
        })
        .await
        .expect("seed document")
        .id
}

pub fn modification_request(
    object: &str,
    approval_date: Option<NaiveDate>,
    demande_id: Option<Uuid>,
) -> CreateBudgetModificationRequest {
    CreateBudgetModificationRequest {
        object: object.to_string(),
        description: None,
        approval_date,
        demande_id,
        response_id: None,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
