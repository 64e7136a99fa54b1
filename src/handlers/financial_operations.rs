use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::financial_operations::{
    CreateBudgetTypeRequest, CreateFinancialOperationRequest, UpdateFinancialOperationRequest,
};
use crate::{errors::ServiceError, ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct FinancialOperationListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub budget_year: Option<i32>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[utoipa::path(post, path = "/api/v1/financial-operations", request_body = CreateFinancialOperationRequest, tag = "financial-operations")]
pub async fn create_financial_operation(
    State(state): State<AppState>,
    Json(payload): Json<CreateFinancialOperationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.financial_operations.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/financial-operations/{id}", tag = "financial-operations")]
pub async fn get_financial_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let operation = state
        .services
        .financial_operations
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Financial operation {} not found", id)))?;
    Ok(Json(ApiResponse::success(operation)))
}

#[utoipa::path(get, path = "/api/v1/financial-operations", tag = "financial-operations")]
pub async fn list_financial_operations(
    State(state): State<AppState>,
    Query(query): Query<FinancialOperationListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .financial_operations
        .list(query.page, query.limit, query.budget_year)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.limit,
    ))))
}

#[utoipa::path(put, path = "/api/v1/financial-operations/{id}", request_body = UpdateFinancialOperationRequest, tag = "financial-operations")]
pub async fn update_financial_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFinancialOperationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .financial_operations
        .update(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/financial-operations/{id}", tag = "financial-operations")]
pub async fn delete_financial_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.financial_operations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/v1/budget-types", request_body = CreateBudgetTypeRequest, tag = "financial-operations")]
pub async fn create_budget_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateBudgetTypeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.budget_types.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/budget-types", tag = "financial-operations")]
pub async fn list_budget_types(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let types = state.services.budget_types.list().await?;
    Ok(Json(ApiResponse::success(types)))
}
