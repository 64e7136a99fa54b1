use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::documents::CreateDocumentRequest;
use crate::services::structures::CreateStructureRequest;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[utoipa::path(post, path = "/api/v1/structures", request_body = CreateStructureRequest, tag = "collaborators")]
pub async fn create_structure(
    State(state): State<AppState>,
    Json(payload): Json<CreateStructureRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.structures.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/structures/{id}", tag = "collaborators")]
pub async fn get_structure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let structure = state
        .services
        .structures
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Structure {} not found", id)))?;
    Ok(Json(ApiResponse::success(structure)))
}

#[utoipa::path(get, path = "/api/v1/structures", tag = "collaborators")]
pub async fn list_structures(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let structures = state.services.structures.list().await?;
    Ok(Json(ApiResponse::success(structures)))
}

#[utoipa::path(post, path = "/api/v1/documents", request_body = CreateDocumentRequest, tag = "collaborators")]
pub async fn create_document(
    State(state): State<AppState>,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.documents.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(get, path = "/api/v1/documents/{id}", tag = "collaborators")]
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let document = state
        .services
        .documents
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Document {} not found", id)))?;
    Ok(Json(ApiResponse::success(document)))
}
