use crate::{
    db::DbPool,
    entities::structure::{self, Entity as StructureEntity, Model as StructureModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStructureRequest {
    #[validate(length(min = 1, max = 255, message = "Structure name is required"))]
    pub name: String,
    pub parent_structure_id: Option<Uuid>,
}

/// Collaborator registry for organizational units. Beyond lookup, the
/// allocator needs the descendant set of a structure for ancestor-scoped
/// distribution listings.
#[derive(Clone)]
pub struct StructureService {
    db_pool: Arc<DbPool>,
}

impl StructureService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateStructureRequest,
    ) -> Result<StructureModel, ServiceError> {
        request.validate()?;

        if let Some(parent_id) = request.parent_structure_id {
            if !self.exists(parent_id).await? {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Parent structure {} does not exist",
                    parent_id
                )));
            }
        }

        let model = structure::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            parent_structure_id: Set(request.parent_structure_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<StructureModel>, ServiceError> {
        StructureEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = StructureEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<StructureModel>, ServiceError> {
        StructureEntity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Returns the structure itself plus every descendant, breadth-first.
    /// The frontier is re-queried per level; organizational trees are
    /// shallow so the round-trips stay small.
    #[instrument(skip(self))]
    pub async fn descendant_ids(&self, root: Uuid) -> Result<Vec<Uuid>, ServiceError> {
        if !self.exists(root).await? {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Structure {} does not exist",
                root
            )));
        }

        let mut seen: HashSet<Uuid> = HashSet::from([root]);
        let mut result = vec![root];
        let mut frontier = vec![root];

        while !frontier.is_empty() {
            let children = StructureEntity::find()
                .filter(structure::Column::ParentStructureId.is_in(frontier.clone()))
                .all(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;

            frontier = children
                .into_iter()
                .filter(|child| seen.insert(child.id))
                .map(|child| {
                    result.push(child.id);
                    child.id
                })
                .collect();
        }

        Ok(result)
    }
}
