//! Budget Planning API Library
//!
//! Core engine for budget allocation and distribution consistency: the
//! classification catalog, the planned-item ledger, the distribution
//! allocator and the budget-modification approval tracker.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod classification;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod openapi;
pub mod services;

use axum::{
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API v1 routes, grouped by component
pub fn api_v1_routes() -> Router<AppState> {
    let catalog = Router::new()
        .route(
            "/domains",
            post(handlers::catalog::create_domain).get(handlers::catalog::list_domains),
        )
        .route(
            "/domains/:id",
            get(handlers::catalog::get_domain)
                .put(handlers::catalog::update_domain)
                .delete(handlers::catalog::delete_domain),
        )
        .route(
            "/rubrics",
            post(handlers::catalog::create_rubric).get(handlers::catalog::list_rubrics),
        )
        .route(
            "/rubrics/:id",
            get(handlers::catalog::get_rubric)
                .put(handlers::catalog::update_rubric)
                .delete(handlers::catalog::delete_rubric),
        )
        .route(
            "/items",
            post(handlers::catalog::create_item).get(handlers::catalog::list_items),
        )
        .route(
            "/items/:id",
            get(handlers::catalog::get_item)
                .put(handlers::catalog::update_item)
                .delete(handlers::catalog::delete_item),
        )
        .route(
            "/item-statuses",
            post(handlers::catalog::create_item_status).get(handlers::catalog::list_item_statuses),
        )
        .route(
            "/item-statuses/:id",
            get(handlers::catalog::get_item_status)
                .put(handlers::catalog::update_item_status)
                .delete(handlers::catalog::delete_item_status),
        );

    let financial_operations = Router::new()
        .route(
            "/financial-operations",
            post(handlers::financial_operations::create_financial_operation)
                .get(handlers::financial_operations::list_financial_operations),
        )
        .route(
            "/financial-operations/:id",
            get(handlers::financial_operations::get_financial_operation)
                .put(handlers::financial_operations::update_financial_operation)
                .delete(handlers::financial_operations::delete_financial_operation),
        )
        .route(
            "/budget-types",
            post(handlers::financial_operations::create_budget_type)
                .get(handlers::financial_operations::list_budget_types),
        );

    let planned_items = Router::new()
        .route(
            "/planned-items",
            post(handlers::planned_items::create_planned_item)
                .get(handlers::planned_items::list_planned_items),
        )
        .route(
            "/planned-items/statistics",
            get(handlers::planned_items::ledger_statistics),
        )
        .route(
            "/planned-items/:id",
            get(handlers::planned_items::get_planned_item)
                .put(handlers::planned_items::update_planned_item)
                .delete(handlers::planned_items::delete_planned_item),
        )
        .route(
            "/planned-items/:id/distributions",
            get(handlers::distributions::list_by_planned_item),
        )
        .route(
            "/planned-items/:id/budget-modification",
            axum::routing::delete(handlers::planned_items::unlink_budget_modification),
        );

    let distributions = Router::new()
        .route(
            "/distributions",
            post(handlers::distributions::allocate),
        )
        .route(
            "/distributions/:id",
            get(handlers::distributions::get_distribution)
                .put(handlers::distributions::update_distribution)
                .delete(handlers::distributions::delete_distribution),
        )
        .route(
            "/structures/:id/distributions",
            get(handlers::distributions::list_by_structure),
        )
        .route(
            "/structures/:id/distributions/subtree",
            get(handlers::distributions::list_by_organizational_ancestor),
        )
        .route(
            "/reports/over-distribution",
            get(handlers::distributions::over_distribution_report),
        )
        .route(
            "/reports/coordination",
            get(handlers::distributions::coordination_report),
        )
        .route(
            "/reports/structure-summary",
            get(handlers::distributions::structure_summary),
        );

    let budget_modifications = Router::new()
        .route(
            "/budget-modifications",
            post(handlers::budget_modifications::create_budget_modification)
                .get(handlers::budget_modifications::list_budget_modifications),
        )
        .route(
            "/budget-modifications/buckets",
            get(handlers::budget_modifications::approval_buckets),
        )
        .route(
            "/budget-modifications/:id",
            get(handlers::budget_modifications::get_budget_modification)
                .put(handlers::budget_modifications::update_budget_modification)
                .delete(handlers::budget_modifications::delete_budget_modification),
        );

    let collaborators = Router::new()
        .route(
            "/structures",
            post(handlers::collaborators::create_structure)
                .get(handlers::collaborators::list_structures),
        )
        .route(
            "/structures/:id",
            get(handlers::collaborators::get_structure),
        )
        .route(
            "/documents",
            post(handlers::collaborators::create_document),
        )
        .route(
            "/documents/:id",
            get(handlers::collaborators::get_document),
        );

    Router::new()
        .merge(catalog)
        .merge(financial_operations)
        .merge(planned_items)
        .merge(distributions)
        .merge(budget_modifications)
        .merge(collaborators)
}
