use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::distributions::{AllocateDistributionRequest, UpdateDistributionRequest};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[utoipa::path(post, path = "/api/v1/distributions", request_body = AllocateDistributionRequest, tag = "distributions")]
pub async fn allocate(
    State(state): State<AppState>,
    Json(payload): Json<AllocateDistributionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.distributions.allocate(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/distributions/{id}", tag = "distributions")]
pub async fn get_distribution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let distribution = state
        .services
        .distributions
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Distribution {} not found", id)))?;
    Ok(Json(ApiResponse::success(distribution)))
}

#[utoipa::path(put, path = "/api/v1/distributions/{id}", request_body = UpdateDistributionRequest, tag = "distributions")]
pub async fn update_distribution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDistributionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.distributions.update(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/distributions/{id}", tag = "distributions")]
pub async fn delete_distribution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.distributions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/v1/planned-items/{id}/distributions", tag = "distributions")]
pub async fn list_by_planned_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state
        .services
        .distributions
        .list_by_planned_item(id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(get, path = "/api/v1/structures/{id}/distributions", tag = "distributions")]
pub async fn list_by_structure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.services.distributions.list_by_structure(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(get, path = "/api/v1/structures/{id}/distributions/subtree", tag = "distributions")]
pub async fn list_by_organizational_ancestor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state
        .services
        .distributions
        .list_by_organizational_ancestor(id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(get, path = "/api/v1/reports/over-distribution", tag = "reports")]
pub async fn over_distribution_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.distributions.over_distribution_report().await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(get, path = "/api/v1/reports/coordination", tag = "reports")]
pub async fn coordination_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.distributions.coordination_report().await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(get, path = "/api/v1/reports/structure-summary", tag = "reports")]
pub async fn structure_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.distributions.structure_summary().await?;
    Ok(Json(ApiResponse::success(report)))
}
