use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::budget_modifications::{
    CreateBudgetModificationRequest, UpdateBudgetModificationRequest,
};
use crate::{errors::ServiceError, ApiResponse, AppState, ListQuery, PaginatedResponse};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[utoipa::path(post, path = "/api/v1/budget-modifications", request_body = CreateBudgetModificationRequest, tag = "budget-modifications")]
pub async fn create_budget_modification(
    State(state): State<AppState>,
    Json(payload): Json<CreateBudgetModificationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .budget_modifications
        .create(payload, today())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/budget-modifications/{id}", tag = "budget-modifications")]
pub async fn get_budget_modification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let modification = state
        .services
        .budget_modifications
        .get(id, today())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Budget modification {} not found", id)))?;
    Ok(Json(ApiResponse::success(modification)))
}

#[utoipa::path(get, path = "/api/v1/budget-modifications", tag = "budget-modifications")]
pub async fn list_budget_modifications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .budget_modifications
        .list(query.page, query.limit, today())
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.limit,
    ))))
}

#[utoipa::path(put, path = "/api/v1/budget-modifications/{id}", request_body = UpdateBudgetModificationRequest, tag = "budget-modifications")]
pub async fn update_budget_modification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBudgetModificationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .budget_modifications
        .update(id, payload, today())
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/budget-modifications/{id}", tag = "budget-modifications")]
pub async fn delete_budget_modification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.budget_modifications.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalBucketQuery {
    /// pending | scheduled | approved | current-year | year | before |
    /// after | recent
    pub bucket: String,
    pub year: Option<i32>,
    pub date: Option<NaiveDate>,
    /// Reference date for state derivation; defaults to today. Exposed so
    /// callers can pin the clock.
    pub as_of: Option<NaiveDate>,
}

#[utoipa::path(get, path = "/api/v1/budget-modifications/buckets", tag = "budget-modifications")]
pub async fn approval_buckets(
    State(state): State<AppState>,
    Query(query): Query<ApprovalBucketQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let service = &state.services.budget_modifications;

    let rows = match query.bucket.as_str() {
        "pending" => service.pending(as_of).await?,
        "scheduled" => service.scheduled(as_of).await?,
        "approved" => service.approved(as_of).await?,
        "current-year" => service.approved_in_current_year(as_of).await?,
        "year" => {
            let year = query.year.ok_or_else(|| {
                ServiceError::ValidationError("bucket=year requires the year parameter".into())
            })?;
            service.approved_in_year(year, as_of).await?
        }
        "before" => {
            let date = query.date.ok_or_else(|| {
                ServiceError::ValidationError("bucket=before requires the date parameter".into())
            })?;
            service.approved_before(date, as_of).await?
        }
        "after" => {
            let date = query.date.ok_or_else(|| {
                ServiceError::ValidationError("bucket=after requires the date parameter".into())
            })?;
            service.approved_after(date, as_of).await?
        }
        "recent" => service.approved_in_last_30_days(as_of).await?,
        other => {
            return Err(ServiceError::ValidationError(format!(
                "Unknown bucket '{}'",
                other
            )))
        }
    };

    Ok(Json(ApiResponse::success(rows)))
}
