use crate::{
    db::DbPool,
    entities::budget_type::{self, Entity as BudgetTypeEntity, Model as BudgetTypeModel},
    entities::financial_operation::{
        self, Entity as FinancialOperationEntity, Model as FinancialOperationModel,
    },
    entities::planned_item::{self, Entity as PlannedItemEntity},
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
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetTypeRequest {
    #[validate(length(min = 1, max = 255, message = "Designation is required"))]
    pub designation_fr: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFinancialOperationRequest {
    #[validate(length(min = 1, max = 255, message = "Operation name is required"))]
    pub operation: String,
    pub budget_year: i32,
    pub budget_type_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFinancialOperationRequest {
    #[validate(length(min = 1, max = 255, message = "Operation name must not be empty"))]
    pub operation: Option<String>,
    pub budget_year: Option<i32>,
    pub budget_type_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FinancialOperationResponse {
    pub id: Uuid,
    pub operation: String,
    pub budget_year: i32,
    pub budget_type_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<FinancialOperationModel> for FinancialOperationResponse {
    fn from(model: FinancialOperationModel) -> Self {
        Self {
            id: model.id,
            operation: model.operation,
            budget_year: model.budget_year,
            budget_type_id: model.budget_type_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Registry of (budget year, budget type, operation) tuples that planned
/// items execute against.
#[derive(Clone)]
pub struct FinancialOperationService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl FinancialOperationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(operation = %request.operation))]
    pub async fn create(
        &self,
        request: CreateFinancialOperationRequest,
    ) -> Result<FinancialOperationResponse, ServiceError> {
        request.validate()?;

        let budget_type = BudgetTypeEntity::find_by_id(request.budget_type_id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if budget_type == 0 {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Budget type {} does not exist",
                request.budget_type_id
            )));
        }

        let duplicate = FinancialOperationEntity::find()
            .filter(financial_operation::Column::Operation.eq(request.operation.clone()))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate > 0 {
            return Err(ServiceError::UniquenessViolation(format!(
                "Financial operation '{}' already exists",
                request.operation
            )));
        }

        let model = financial_operation::ActiveModel {
            id: Set(Uuid::new_v4()),
            operation: Set(request.operation),
            budget_year: Set(request.budget_year),
            budget_type_id: Set(request.budget_type_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::FinancialOperationCreated(created.id))
                .await
            {
                warn!(error = %e, operation_id = %created.id, "Failed to send financial operation created event");
            }
        }

        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<FinancialOperationResponse>, ServiceError> {
        let found = FinancialOperationEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(Into::into))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateFinancialOperationRequest,
    ) -> Result<FinancialOperationResponse, ServiceError> {
        request.validate()?;

        let existing = FinancialOperationEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Financial operation {} not found", id))
            })?;

        if let Some(budget_type_id) = request.budget_type_id {
            let budget_type = BudgetTypeEntity::find_by_id(budget_type_id)
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if budget_type == 0 {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Budget type {} does not exist",
                    budget_type_id
                )));
            }
        }

        if let Some(operation) = &request.operation {
            let duplicate = FinancialOperationEntity::find()
                .filter(financial_operation::Column::Operation.eq(operation.clone()))
                .filter(financial_operation::Column::Id.ne(id))
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if duplicate > 0 {
                return Err(ServiceError::UniquenessViolation(format!(
                    "Financial operation '{}' already exists",
                    operation
                )));
            }
        }

        let mut active: financial_operation::ActiveModel = existing.into();
        if let Some(v) = request.operation {
            active.operation = Set(v);
        }
        if let Some(v) = request.budget_year {
            active.budget_year = Set(v);
        }
        if let Some(v) = request.budget_type_id {
            active.budget_type_id = Set(v);
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

        let existing = FinancialOperationEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Financial operation {} not found", id))
            })?;

        let dependents = PlannedItemEntity::find()
            .filter(planned_item::Column::FinancialOperationId.eq(id))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if dependents > 0 {
            return Err(ServiceError::Conflict(format!(
                "Financial operation {} is referenced by {} planned item(s)",
                id, dependents
            )));
        }

        FinancialOperationEntity::delete_by_id(existing.id)
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
        budget_year: Option<i32>,
    ) -> Result<(Vec<FinancialOperationResponse>, u64), ServiceError> {
        let mut query = FinancialOperationEntity::find();
        if let Some(year) = budget_year {
            query = query.filter(financial_operation::Column::BudgetYear.eq(year));
        }

        let paginator = query
            .order_by_asc(financial_operation::Column::Operation)
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
        let count = FinancialOperationEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        FinancialOperationEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

/// Lookup-only vocabulary of budget types, plus the creation endpoint the
/// administration seeds it with.
#[derive(Clone)]
pub struct BudgetTypeService {
    db_pool: Arc<DbPool>,
}

impl BudgetTypeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(designation_fr = %request.designation_fr))]
    pub async fn create(
        &self,
        request: CreateBudgetTypeRequest,
    ) -> Result<BudgetTypeModel, ServiceError> {
        request.validate()?;

        let duplicate = BudgetTypeEntity::find()
            .filter(budget_type::Column::DesignationFr.eq(request.designation_fr.clone()))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate > 0 {
            return Err(ServiceError::UniquenessViolation(format!(
                "Budget type '{}' already exists",
                request.designation_fr
            )));
        }

        let model = budget_type::ActiveModel {
            id: Set(Uuid::new_v4()),
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
    pub async fn get(&self, id: Uuid) -> Result<Option<BudgetTypeModel>, ServiceError> {
        BudgetTypeEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<BudgetTypeModel>, ServiceError> {
        BudgetTypeEntity::find()
            .order_by_asc(budget_type::Column::DesignationFr)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
