use crate::{
    db::DbPool,
    entities::budget_modification::{
        self, ApprovalState, Entity as BudgetModificationEntity, Model as BudgetModificationModel,
    },
    entities::document::Entity as DocumentEntity,
    entities::planned_item::{self, Entity as PlannedItemEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetModificationRequest {
    #[validate(length(min = 1, max = 255, message = "Object is required"))]
    pub object: String,
    pub description: Option<String>,
    pub approval_date: Option<NaiveDate>,
    /// Required; kept optional in the payload so a missing demande is a
    /// validation error rather than a deserialization failure.
    pub demande_id: Option<Uuid>,
    pub response_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateBudgetModificationRequest {
    #[validate(length(min = 1, max = 255, message = "Object must not be empty"))]
    pub object: Option<String>,
    pub description: Option<String>,
    pub approval_date: Option<NaiveDate>,
    /// Explicit reset back to pending; JSON cannot distinguish an absent
    /// approval_date from a null one.
    #[serde(default)]
    pub clear_approval_date: bool,
    pub response_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetModificationResponse {
    pub id: Uuid,
    pub object: String,
    pub description: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub demande_id: Uuid,
    pub response_id: Option<Uuid>,
    /// Derived from approval_date against the as-of date; never stored.
    pub approval_state: ApprovalState,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BudgetModificationResponse {
    fn from_model(model: BudgetModificationModel, as_of: NaiveDate) -> Self {
        Self {
            approval_state: model.approval_state(as_of),
            id: model.id,
            object: model.object,
            description: model.description,
            approval_date: model.approval_date,
            demande_id: model.demande_id,
            response_id: model.response_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Tracker for budget-modification approvals and the compound
/// (approval_date, demande) uniqueness invariant. The pre-checks here are
/// advisory; the composite unique index is the authority, and a
/// constraint fault from a lost race maps to the same
/// `UniquenessViolation` the pre-check raises.
#[derive(Clone)]
pub struct BudgetModificationService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl BudgetModificationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn document_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = DocumentEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    async fn pair_taken(
        &self,
        approval_date: NaiveDate,
        demande_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        let mut query = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.eq(approval_date))
            .filter(budget_modification::Column::DemandeId.eq(demande_id));
        if let Some(own_id) = exclude {
            query = query.filter(budget_modification::Column::Id.ne(own_id));
        }
        let count = query
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self, request), fields(object = %request.object))]
    pub async fn create(
        &self,
        request: CreateBudgetModificationRequest,
        as_of: NaiveDate,
    ) -> Result<BudgetModificationResponse, ServiceError> {
        request.validate()?;

        let demande_id = request.demande_id.ok_or_else(|| {
            ServiceError::ValidationError("A demande document is required".to_string())
        })?;

        if !self.document_exists(demande_id).await? {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Demande document {} does not exist",
                demande_id
            )));
        }
        if let Some(response_id) = request.response_id {
            if !self.document_exists(response_id).await? {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Response document {} does not exist",
                    response_id
                )));
            }
        }

        if let Some(approval_date) = request.approval_date {
            if self.pair_taken(approval_date, demande_id, None).await? {
                return Err(ServiceError::UniquenessViolation(format!(
                    "A budget modification for demande {} is already approved on {}",
                    demande_id, approval_date
                )));
            }
        }

        let model = budget_modification::ActiveModel {
            id: Set(Uuid::new_v4()),
            object: Set(request.object),
            description: Set(request.description),
            approval_date: Set(request.approval_date),
            demande_id: Set(demande_id),
            response_id: Set(request.response_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        // The insert can still lose a race against an identical pair; the
        // unique index turns that into the same UniquenessViolation.
        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::BudgetModificationCreated(created.id))
                .await
            {
                warn!(error = %e, modification_id = %created.id, "Failed to send budget modification created event");
            }
        }

        Ok(BudgetModificationResponse::from_model(created, as_of))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Option<BudgetModificationResponse>, ServiceError> {
        let found = BudgetModificationEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(|model| BudgetModificationResponse::from_model(model, as_of)))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateBudgetModificationRequest,
        as_of: NaiveDate,
    ) -> Result<BudgetModificationResponse, ServiceError> {
        request.validate()?;

        let existing = BudgetModificationEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Budget modification {} not found", id))
            })?;

        if let Some(response_id) = request.response_id {
            if !self.document_exists(response_id).await? {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Response document {} does not exist",
                    response_id
                )));
            }
        }

        // Same uniqueness check as create, excluding the row's own id.
        if let Some(approval_date) = request.approval_date {
            if self
                .pair_taken(approval_date, existing.demande_id, Some(id))
                .await?
            {
                return Err(ServiceError::UniquenessViolation(format!(
                    "A budget modification for demande {} is already approved on {}",
                    existing.demande_id, approval_date
                )));
            }
        }

        let approval_was_set = request.approval_date;

        let mut active: budget_modification::ActiveModel = existing.into();
        if let Some(v) = request.object {
            active.object = Set(v);
        }
        if let Some(v) = request.description {
            active.description = Set(Some(v));
        }
        if request.clear_approval_date {
            active.approval_date = Set(None);
        } else if let Some(v) = request.approval_date {
            active.approval_date = Set(Some(v));
        }
        if let Some(v) = request.response_id {
            active.response_id = Set(Some(v));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let (Some(sender), Some(approval_date)) = (&self.event_sender, approval_was_set) {
            if let Err(e) = sender
                .send(Event::BudgetModificationApprovalSet {
                    modification_id: id,
                    approval_date,
                })
                .await
            {
                warn!(error = %e, modification_id = %id, "Failed to send approval set event");
            }
        }

        Ok(BudgetModificationResponse::from_model(updated, as_of))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(ServiceError::DatabaseError)?;

        let existing = BudgetModificationEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Budget modification {} not found", id))
            })?;

        let dependents = PlannedItemEntity::find()
            .filter(planned_item::Column::BudgetModificationId.eq(id))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if dependents > 0 {
            return Err(ServiceError::Conflict(format!(
                "Budget modification {} is linked by {} planned item(s)",
                id, dependents
            )));
        }

        BudgetModificationEntity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete_err)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::BudgetModificationDeleted(id)).await {
                warn!(error = %e, modification_id = %id, "Failed to send budget modification deleted event");
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        as_of: NaiveDate,
    ) -> Result<(Vec<BudgetModificationResponse>, u64), ServiceError> {
        let paginator = BudgetModificationEntity::find()
            .order_by_desc(budget_modification::Column::CreatedAt)
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
            rows.into_iter()
                .map(|model| BudgetModificationResponse::from_model(model, as_of))
                .collect(),
            total,
        ))
    }

    // Bucketed read-side classifications. Every query takes the as-of
    // date explicitly so callers pin the clock; results for "current
    // year" or "recent" are only as stable as the date passed in.

    #[instrument(skip(self))]
    pub async fn pending(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        let rows = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.is_null())
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .map(|model| BudgetModificationResponse::from_model(model, as_of))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn scheduled(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        let rows = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.gt(as_of))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .map(|model| BudgetModificationResponse::from_model(model, as_of))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn approved(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        let rows = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.lte(as_of))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .map(|model| BudgetModificationResponse::from_model(model, as_of))
            .collect())
    }

    /// Approvals dated inside the given year. Rows scheduled past the
    /// as-of date are not approved yet and stay out of the bucket.
    #[instrument(skip(self))]
    pub async fn approved_in_year(
        &self,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
            ServiceError::ValidationError(format!("Invalid year {}", year))
        })?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| {
            ServiceError::ValidationError(format!("Invalid year {}", year))
        })?;

        let rows = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.between(start, end))
            .filter(budget_modification::Column::ApprovalDate.lte(as_of))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .map(|model| BudgetModificationResponse::from_model(model, as_of))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn approved_in_current_year(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        self.approved_in_year(as_of.year(), as_of).await
    }

    /// Approvals dated strictly before `date`. Bounded by the as-of date
    /// so a future cutoff cannot pull in rows that are merely scheduled.
    #[instrument(skip(self))]
    pub async fn approved_before(
        &self,
        date: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        let rows = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.lt(date))
            .filter(budget_modification::Column::ApprovalDate.lte(as_of))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .map(|model| BudgetModificationResponse::from_model(model, as_of))
            .collect())
    }

    /// Approvals dated strictly after `date`, up to the as-of date.
    #[instrument(skip(self))]
    pub async fn approved_after(
        &self,
        date: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        let rows = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.gt(date))
            .filter(budget_modification::Column::ApprovalDate.lte(as_of))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .map(|model| BudgetModificationResponse::from_model(model, as_of))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn approved_in_last_30_days(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<BudgetModificationResponse>, ServiceError> {
        let window_start = as_of
            .checked_sub_days(Days::new(30))
            .unwrap_or(NaiveDate::MIN);

        let rows = BudgetModificationEntity::find()
            .filter(budget_modification::Column::ApprovalDate.between(window_start, as_of))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .map(|model| BudgetModificationResponse::from_model(model, as_of))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        BudgetModificationEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
