use crate::{
    db::DbPool,
    entities::document::{self, Entity as DocumentEntity, Model as DocumentModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1, max = 255, message = "Document reference is required"))]
    pub reference: String,
    pub title: Option<String>,
}

/// Collaborator registry for demande/response documents. The engine only
/// needs creation, lookup by id and existence checks.
#[derive(Clone)]
pub struct DocumentService {
    db_pool: Arc<DbPool>,
}

impl DocumentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<DocumentModel, ServiceError> {
        request.validate()?;

        let model = document::ActiveModel {
            id: Set(Uuid::new_v4()),
            reference: Set(request.reference),
            title: Set(request.title),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<DocumentModel>, ServiceError> {
        DocumentEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = DocumentEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }
}
