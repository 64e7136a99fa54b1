use crate::{
    classification::{DesignationClassifier, ItemNature, KeywordClassifier},
    db::DbPool,
    entities::domain::{self, Entity as DomainEntity, Model as DomainModel},
    entities::item::{self, Entity as ItemEntity, Model as ItemModel},
    entities::item_status::{self, Entity as ItemStatusEntity, Model as ItemStatusModel},
    entities::planned_item::{self, Entity as PlannedItemEntity},
    entities::rubric::{self, Entity as RubricEntity, Model as RubricModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDomainRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation is required"))]
    pub designation_fr: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDomainRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation must not be empty"))]
    pub designation_fr: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DomainResponse {
    pub id: Uuid,
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    pub designation_fr: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<DomainModel> for DomainResponse {
    fn from(model: DomainModel) -> Self {
        Self {
            id: model.id,
            designation_ar: model.designation_ar,
            designation_en: model.designation_en,
            designation_fr: model.designation_fr,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Service for the top level of the classification hierarchy.
#[derive(Clone)]
pub struct DomainService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl DomainService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(designation_fr = %request.designation_fr))]
    pub async fn create(
        &self,
        request: CreateDomainRequest,
    ) -> Result<DomainResponse, ServiceError> {
        request.validate()?;

        // Advisory pre-check; the unique index is the authority.
        let duplicate = DomainEntity::find()
            .filter(domain::Column::DesignationFr.eq(request.designation_fr.clone()))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate > 0 {
            return Err(ServiceError::UniquenessViolation(format!(
                "Domain designation '{}' already exists",
                request.designation_fr
            )));
        }

        let model = domain::ActiveModel {
            id: Set(Uuid::new_v4()),
            designation_ar: Set(request.designation_ar),
            designation_en: Set(request.designation_en),
            designation_fr: Set(request.designation_fr),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::DomainCreated(created.id)).await {
                warn!(error = %e, domain_id = %created.id, "Failed to send domain created event");
            }
        }

        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<DomainResponse>, ServiceError> {
        let found = DomainEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(Into::into))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDomainRequest,
    ) -> Result<DomainResponse, ServiceError> {
        request.validate()?;

        let existing = DomainEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Domain {} not found", id)))?;

        if let Some(designation_fr) = &request.designation_fr {
            let duplicate = DomainEntity::find()
                .filter(domain::Column::DesignationFr.eq(designation_fr.clone()))
                .filter(domain::Column::Id.ne(id))
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if duplicate > 0 {
                return Err(ServiceError::UniquenessViolation(format!(
                    "Domain designation '{}' already exists",
                    designation_fr
                )));
            }
        }

        let mut active: domain::ActiveModel = existing.into();
        if let Some(v) = request.designation_ar {
            active.designation_ar = Set(Some(v));
        }
        if let Some(v) = request.designation_en {
            active.designation_en = Set(Some(v));
        }
        if let Some(v) = request.designation_fr {
            active.designation_fr = Set(v);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        Ok(updated.into())
    }

    /// Deletion is blocked while rubrics still reference the domain. The
    /// pre-check runs inside the delete transaction so a racing child
    /// insert cannot slip between check and delete; the RESTRICT foreign
    /// key is the backstop either way.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for domain delete");
            ServiceError::DatabaseError(e)
        })?;

        let existing = DomainEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Domain {} not found", id)))?;

        let children = RubricEntity::find()
            .filter(rubric::Column::DomainId.eq(id))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if children > 0 {
            return Err(ServiceError::Conflict(format!(
                "Domain {} still owns {} rubric(s)",
                id, children
            )));
        }

        DomainEntity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete_err)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::DomainDeleted(id)).await {
                warn!(error = %e, domain_id = %id, "Failed to send domain deleted event");
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<DomainResponse>, u64), ServiceError> {
        let paginator = DomainEntity::find()
            .order_by_asc(domain::Column::DesignationFr)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = DomainEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        DomainEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

// ---------------------------------------------------------------------------
// Rubrics
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRubricRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation is required"))]
    pub designation_fr: String,
    pub domain_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRubricRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation must not be empty"))]
    pub designation_fr: Option<String>,
    pub domain_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RubricResponse {
    pub id: Uuid,
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    pub designation_fr: String,
    pub domain_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RubricModel> for RubricResponse {
    fn from(model: RubricModel) -> Self {
        Self {
            id: model.id,
            designation_ar: model.designation_ar,
            designation_en: model.designation_en,
            designation_fr: model.designation_fr,
            domain_id: model.domain_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct RubricService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl RubricService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(designation_fr = %request.designation_fr))]
    pub async fn create(
        &self,
        request: CreateRubricRequest,
    ) -> Result<RubricResponse, ServiceError> {
        request.validate()?;

        let parent = DomainEntity::find_by_id(request.domain_id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if parent == 0 {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Domain {} does not exist",
                request.domain_id
            )));
        }

        let duplicate = RubricEntity::find()
            .filter(rubric::Column::DesignationFr.eq(request.designation_fr.clone()))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate > 0 {
            return Err(ServiceError::UniquenessViolation(format!(
                "Rubric designation '{}' already exists",
                request.designation_fr
            )));
        }

        let model = rubric::ActiveModel {
            id: Set(Uuid::new_v4()),
            designation_ar: Set(request.designation_ar),
            designation_en: Set(request.designation_en),
            designation_fr: Set(request.designation_fr),
            domain_id: Set(request.domain_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::RubricCreated(created.id)).await {
                warn!(error = %e, rubric_id = %created.id, "Failed to send rubric created event");
            }
        }

        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<RubricResponse>, ServiceError> {
        let found = RubricEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(Into::into))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateRubricRequest,
    ) -> Result<RubricResponse, ServiceError> {
        request.validate()?;

        let existing = RubricEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Rubric {} not found", id)))?;

        if let Some(domain_id) = request.domain_id {
            let parent = DomainEntity::find_by_id(domain_id)
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if parent == 0 {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Domain {} does not exist",
                    domain_id
                )));
            }
        }

        if let Some(designation_fr) = &request.designation_fr {
            let duplicate = RubricEntity::find()
                .filter(rubric::Column::DesignationFr.eq(designation_fr.clone()))
                .filter(rubric::Column::Id.ne(id))
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if duplicate > 0 {
                return Err(ServiceError::UniquenessViolation(format!(
                    "Rubric designation '{}' already exists",
                    designation_fr
                )));
            }
        }

        let mut active: rubric::ActiveModel = existing.into();
        if let Some(v) = request.designation_ar {
            active.designation_ar = Set(Some(v));
        }
        if let Some(v) = request.designation_en {
            active.designation_en = Set(Some(v));
        }
        if let Some(v) = request.designation_fr {
            active.designation_fr = Set(v);
        }
        if let Some(v) = request.domain_id {
            active.domain_id = Set(v);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(ServiceError::DatabaseError)?;

        let existing = RubricEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Rubric {} not found", id)))?;

        let children = ItemEntity::find()
            .filter(item::Column::RubricId.eq(id))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if children > 0 {
            return Err(ServiceError::Conflict(format!(
                "Rubric {} still owns {} item(s)",
                id, children
            )));
        }

        RubricEntity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete_err)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<RubricResponse>, u64), ServiceError> {
        let paginator = RubricEntity::find()
            .order_by_asc(rubric::Column::DesignationFr)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    pub async fn list_by_domain(&self, domain_id: Uuid) -> Result<Vec<RubricResponse>, ServiceError> {
        let rows = RubricEntity::find()
            .filter(rubric::Column::DomainId.eq(domain_id))
            .order_by_asc(rubric::Column::DesignationFr)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = RubricEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        RubricEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation is required"))]
    pub designation_fr: String,
    pub rubric_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation must not be empty"))]
    pub designation_fr: Option<String>,
    pub rubric_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    pub id: Uuid,
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    pub designation_fr: String,
    pub rubric_id: Uuid,
    /// Heuristic label; no correctness contract.
    pub nature: ItemNature,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ItemService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    classifier: Arc<dyn DesignationClassifier>,
}

impl ItemService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self::with_classifier(db_pool, event_sender, Arc::new(KeywordClassifier))
    }

    pub fn with_classifier(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        classifier: Arc<dyn DesignationClassifier>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            classifier,
        }
    }

    fn model_to_response(&self, model: ItemModel) -> ItemResponse {
        let nature = self.classifier.classify(&model.designation_fr);
        ItemResponse {
            id: model.id,
            designation_ar: model.designation_ar,
            designation_en: model.designation_en,
            designation_fr: model.designation_fr,
            rubric_id: model.rubric_id,
            nature,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    #[instrument(skip(self, request), fields(designation_fr = %request.designation_fr))]
    pub async fn create(&self, request: CreateItemRequest) -> Result<ItemResponse, ServiceError> {
        request.validate()?;

        let parent = RubricEntity::find_by_id(request.rubric_id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if parent == 0 {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Rubric {} does not exist",
                request.rubric_id
            )));
        }

        let model = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            designation_ar: Set(request.designation_ar),
            designation_en: Set(request.designation_en),
            designation_fr: Set(request.designation_fr),
            rubric_id: Set(request.rubric_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::ItemCreated(created.id)).await {
                warn!(error = %e, item_id = %created.id, "Failed to send item created event");
            }
        }

        Ok(self.model_to_response(created))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<ItemResponse>, ServiceError> {
        let found = ItemEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(|m| self.model_to_response(m)))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<ItemResponse, ServiceError> {
        request.validate()?;

        let existing = ItemEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))?;

        if let Some(rubric_id) = request.rubric_id {
            let parent = RubricEntity::find_by_id(rubric_id)
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if parent == 0 {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Rubric {} does not exist",
                    rubric_id
                )));
            }
        }

        let mut active: item::ActiveModel = existing.into();
        if let Some(v) = request.designation_ar {
            active.designation_ar = Set(Some(v));
        }
        if let Some(v) = request.designation_en {
            active.designation_en = Set(Some(v));
        }
        if let Some(v) = request.designation_fr {
            active.designation_fr = Set(v);
        }
        if let Some(v) = request.rubric_id {
            active.rubric_id = Set(v);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        Ok(self.model_to_response(updated))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(ServiceError::DatabaseError)?;

        let existing = ItemEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))?;

        let dependents = PlannedItemEntity::find()
            .filter(planned_item::Column::ItemId.eq(id))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if dependents > 0 {
            return Err(ServiceError::Conflict(format!(
                "Item {} is referenced by {} planned item(s)",
                id, dependents
            )));
        }

        ItemEntity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete_err)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<ItemResponse>, u64), ServiceError> {
        let paginator = ItemEntity::find()
            .order_by_asc(item::Column::DesignationFr)
            .paginate(&*self.db_pool, limit.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((
            rows.into_iter().map(|m| self.model_to_response(m)).collect(),
            total,
        ))
    }

    #[instrument(skip(self))]
    pub async fn list_by_rubric(&self, rubric_id: Uuid) -> Result<Vec<ItemResponse>, ServiceError> {
        let rows = ItemEntity::find()
            .filter(item::Column::RubricId.eq(rubric_id))
            .order_by_asc(item::Column::DesignationFr)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.into_iter().map(|m| self.model_to_response(m)).collect())
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = ItemEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        ItemEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

// ---------------------------------------------------------------------------
// Item statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemStatusRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation is required"))]
    pub designation_fr: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemStatusRequest {
    pub designation_ar: Option<String>,
    pub designation_en: Option<String>,
    #[validate(length(min = 1, max = 255, message = "French designation must not be empty"))]
    pub designation_fr: Option<String>,
}

#[derive(Clone)]
pub struct ItemStatusService {
    db_pool: Arc<DbPool>,
}

impl ItemStatusService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(designation_fr = %request.designation_fr))]
    pub async fn create(
        &self,
        request: CreateItemStatusRequest,
    ) -> Result<ItemStatusModel, ServiceError> {
        request.validate()?;

        let duplicate = ItemStatusEntity::find()
            .filter(item_status::Column::DesignationFr.eq(request.designation_fr.clone()))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate > 0 {
            return Err(ServiceError::UniquenessViolation(format!(
                "Item status designation '{}' already exists",
                request.designation_fr
            )));
        }

        let model = item_status::ActiveModel {
            id: Set(Uuid::new_v4()),
            designation_ar: Set(request.designation_ar),
            designation_en: Set(request.designation_en),
            designation_fr: Set(request.designation_fr),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<ItemStatusModel>, ServiceError> {
        ItemStatusEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateItemStatusRequest,
    ) -> Result<ItemStatusModel, ServiceError> {
        request.validate()?;

        let existing = ItemStatusEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item status {} not found", id)))?;

        if let Some(designation_fr) = &request.designation_fr {
            let duplicate = ItemStatusEntity::find()
                .filter(item_status::Column::DesignationFr.eq(designation_fr.clone()))
                .filter(item_status::Column::Id.ne(id))
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if duplicate > 0 {
                return Err(ServiceError::UniquenessViolation(format!(
                    "Item status designation '{}' already exists",
                    designation_fr
                )));
            }
        }

        let mut active: item_status::ActiveModel = existing.into();
        if let Some(v) = request.designation_ar {
            active.designation_ar = Set(Some(v));
        }
        if let Some(v) = request.designation_en {
            active.designation_en = Set(Some(v));
        }
        if let Some(v) = request.designation_fr {
            active.designation_fr = Set(v);
        }
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(ServiceError::DatabaseError)?;

        let existing = ItemStatusEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item status {} not found", id)))?;

        let dependents = PlannedItemEntity::find()
            .filter(planned_item::Column::ItemStatusId.eq(id))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if dependents > 0 {
            return Err(ServiceError::Conflict(format!(
                "Item status {} is referenced by {} planned item(s)",
                id, dependents
            )));
        }

        ItemStatusEntity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete_err)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ItemStatusModel>, ServiceError> {
        ItemStatusEntity::find()
            .order_by_asc(item_status::Column::DesignationFr)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = ItemStatusEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        ItemStatusEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
