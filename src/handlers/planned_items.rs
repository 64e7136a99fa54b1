use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::planned_item::BudgetCategory;
use crate::services::planned_items::{CreatePlannedItemRequest, UpdatePlannedItemRequest};
use crate::{errors::ServiceError, ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlannedItemListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub item_id: Option<Uuid>,
    pub financial_operation_id: Option<Uuid>,
    pub item_status_id: Option<Uuid>,
    pub budget_modification_id: Option<Uuid>,
    /// Derived classification filter; evaluated at read time.
    pub budget_category: Option<BudgetCategory>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[utoipa::path(post, path = "/api/v1/planned-items", request_body = CreatePlannedItemRequest, tag = "planned-items")]
pub async fn create_planned_item(
    State(state): State<AppState>,
    Json(payload): Json<CreatePlannedItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.planned_items.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/planned-items/{id}", tag = "planned-items")]
pub async fn get_planned_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let planned_item = state
        .services
        .planned_items
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Planned item {} not found", id)))?;
    Ok(Json(ApiResponse::success(planned_item)))
}

#[utoipa::path(get, path = "/api/v1/planned-items", tag = "planned-items")]
pub async fn list_planned_items(
    State(state): State<AppState>,
    Query(query): Query<PlannedItemListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let service = &state.services.planned_items;

    // Filtered projections are unpaged; the paged listing is the default.
    let filtered = if let Some(item_id) = query.item_id {
        Some(service.list_by_item(item_id).await?)
    } else if let Some(operation_id) = query.financial_operation_id {
        Some(service.list_by_financial_operation(operation_id).await?)
    } else if let Some(status_id) = query.item_status_id {
        Some(service.list_by_status(status_id).await?)
    } else if let Some(modification_id) = query.budget_modification_id {
        Some(service.list_by_budget_modification(modification_id).await?)
    } else if let Some(category) = query.budget_category {
        Some(service.list_by_budget_category(category).await?)
    } else {
        None
    };

    if let Some(items) = filtered {
        return Ok(Json(ApiResponse::success(items)).into_response());
    }

    let (items, total) = service.list(query.page, query.limit).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.limit,
    )))
    .into_response())
}

#[utoipa::path(put, path = "/api/v1/planned-items/{id}", request_body = UpdatePlannedItemRequest, tag = "planned-items")]
pub async fn update_planned_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlannedItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.planned_items.update(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/planned-items/{id}", tag = "planned-items")]
pub async fn delete_planned_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.planned_items.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(delete, path = "/api/v1/planned-items/{id}/budget-modification", tag = "planned-items")]
pub async fn unlink_budget_modification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .planned_items
        .unlink_budget_modification(id)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(get, path = "/api/v1/planned-items/statistics", tag = "planned-items")]
pub async fn ledger_statistics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = state.services.planned_items.statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}
