use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::catalog::{
    CreateDomainRequest, CreateItemRequest, CreateItemStatusRequest, CreateRubricRequest,
    UpdateDomainRequest, UpdateItemRequest, UpdateItemStatusRequest, UpdateRubricRequest,
};
use crate::{errors::ServiceError, ApiResponse, AppState, ListQuery, PaginatedResponse};

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

#[utoipa::path(post, path = "/api/v1/domains", request_body = CreateDomainRequest, tag = "catalog")]
pub async fn create_domain(
    State(state): State<AppState>,
    Json(payload): Json<CreateDomainRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.domains.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/domains/{id}", tag = "catalog")]
pub async fn get_domain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let domain = state
        .services
        .domains
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Domain {} not found", id)))?;
    Ok(Json(ApiResponse::success(domain)))
}

#[utoipa::path(get, path = "/api/v1/domains", tag = "catalog")]
pub async fn list_domains(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .domains
        .list(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.limit,
    ))))
}

#[utoipa::path(put, path = "/api/v1/domains/{id}", request_body = UpdateDomainRequest, tag = "catalog")]
pub async fn update_domain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDomainRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.domains.update(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/domains/{id}", tag = "catalog")]
pub async fn delete_domain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.domains.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Rubrics
// ---------------------------------------------------------------------------

#[utoipa::path(post, path = "/api/v1/rubrics", request_body = CreateRubricRequest, tag = "catalog")]
pub async fn create_rubric(
    State(state): State<AppState>,
    Json(payload): Json<CreateRubricRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.rubrics.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/rubrics/{id}", tag = "catalog")]
pub async fn get_rubric(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let rubric = state
        .services
        .rubrics
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Rubric {} not found", id)))?;
    Ok(Json(ApiResponse::success(rubric)))
}

#[utoipa::path(get, path = "/api/v1/rubrics", tag = "catalog")]
pub async fn list_rubrics(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .rubrics
        .list(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.limit,
    ))))
}

#[utoipa::path(put, path = "/api/v1/rubrics/{id}", request_body = UpdateRubricRequest, tag = "catalog")]
pub async fn update_rubric(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRubricRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.rubrics.update(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/rubrics/{id}", tag = "catalog")]
pub async fn delete_rubric(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.rubrics.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[utoipa::path(post, path = "/api/v1/items", request_body = CreateItemRequest, tag = "catalog")]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.items.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/items/{id}", tag = "catalog")]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state
        .services
        .items
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(get, path = "/api/v1/items", tag = "catalog")]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state.services.items.list(query.page, query.limit).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.limit,
    ))))
}

#[utoipa::path(put, path = "/api/v1/items/{id}", request_body = UpdateItemRequest, tag = "catalog")]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.items.update(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/items/{id}", tag = "catalog")]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.items.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Item statuses
// ---------------------------------------------------------------------------

#[utoipa::path(post, path = "/api/v1/item-statuses", request_body = CreateItemStatusRequest, tag = "catalog")]
pub async fn create_item_status(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.item_statuses.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/item-statuses/{id}", tag = "catalog")]
pub async fn get_item_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = state
        .services
        .item_statuses
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Item status {} not found", id)))?;
    Ok(Json(ApiResponse::success(status)))
}

#[utoipa::path(get, path = "/api/v1/item-statuses", tag = "catalog")]
pub async fn list_item_statuses(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let statuses = state.services.item_statuses.list().await?;
    Ok(Json(ApiResponse::success(statuses)))
}

#[utoipa::path(put, path = "/api/v1/item-statuses/{id}", request_body = UpdateItemStatusRequest, tag = "catalog")]
pub async fn update_item_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.item_statuses.update(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(delete, path = "/api/v1/item-statuses/{id}", tag = "catalog")]
pub async fn delete_item_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.item_statuses.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
