use crate::{
    db::DbPool,
    entities::budget_modification::Entity as BudgetModificationEntity,
    entities::financial_operation::Entity as FinancialOperationEntity,
    entities::item::Entity as ItemEntity,
    entities::item_distribution::{self, Entity as ItemDistributionEntity},
    entities::item_status::Entity as ItemStatusEntity,
    entities::planned_item::{
        self, BudgetCategory, CostCategory, Entity as PlannedItemEntity, Model as PlannedItemModel,
        QuantityScale,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::validate_non_negative,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
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

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePlannedItemRequest {
    #[validate(length(min = 1, max = 255, message = "Designation is required"))]
    pub designation: String,
    #[validate(custom = "validate_non_negative")]
    pub unit_cost: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub planned_quantity: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub allocated_amount: Decimal,
    pub item_id: Uuid,
    pub financial_operation_id: Uuid,
    pub item_status_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePlannedItemRequest {
    #[validate(length(min = 1, max = 255, message = "Designation must not be empty"))]
    pub designation: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub unit_cost: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub planned_quantity: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub allocated_amount: Option<Decimal>,
    pub item_status_id: Option<Uuid>,
    /// Link to an approved budget modification. Passing Some(None) is not
    /// representable over JSON; unlinking goes through `unlink_budget_modification`.
    pub budget_modification_id: Option<Uuid>,
}

/// Planned item with every derived financial metric computed at response
/// time from the three stored numeric fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlannedItemResponse {
    pub id: Uuid,
    pub designation: String,
    pub unit_cost: Decimal,
    pub planned_quantity: Decimal,
    pub allocated_amount: Decimal,
    pub item_id: Uuid,
    pub financial_operation_id: Uuid,
    pub item_status_id: Uuid,
    pub budget_modification_id: Option<Uuid>,
    pub total_cost: Decimal,
    pub variance: Decimal,
    pub utilization: Option<Decimal>,
    pub budget_category: BudgetCategory,
    pub cost_category: CostCategory,
    pub quantity_scale: QuantityScale,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<PlannedItemModel> for PlannedItemResponse {
    fn from(model: PlannedItemModel) -> Self {
        Self {
            total_cost: model.total_cost(),
            variance: model.variance(),
            utilization: model.utilization(),
            budget_category: model.budget_category(),
            cost_category: model.cost_category(),
            quantity_scale: model.quantity_scale(),
            id: model.id,
            designation: model.designation,
            unit_cost: model.unit_cost,
            planned_quantity: model.planned_quantity,
            allocated_amount: model.allocated_amount,
            item_id: model.item_id,
            financial_operation_id: model.financial_operation_id,
            item_status_id: model.item_status_id,
            budget_modification_id: model.budget_modification_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Whole-ledger reductions. Recomputed from the current row set on every
/// call; an empty ledger yields zeros, never an error.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct LedgerStatistics {
    pub planned_item_count: u64,
    pub total_allocated: Decimal,
    pub total_cost: Decimal,
    pub average_unit_cost: Decimal,
    pub average_planned_quantity: Decimal,
    pub max_unit_cost: Decimal,
    pub max_allocated_amount: Decimal,
}

/// Service for the planned-expenditure ledger.
#[derive(Clone)]
pub struct PlannedItemService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PlannedItemService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn check_references(
        &self,
        item_id: Uuid,
        financial_operation_id: Uuid,
        item_status_id: Uuid,
    ) -> Result<(), ServiceError> {
        let item = ItemEntity::find_by_id(item_id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if item == 0 {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Item {} does not exist",
                item_id
            )));
        }

        let operation = FinancialOperationEntity::find_by_id(financial_operation_id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if operation == 0 {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Financial operation {} does not exist",
                financial_operation_id
            )));
        }

        let status = ItemStatusEntity::find_by_id(item_status_id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if status == 0 {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Item status {} does not exist",
                item_status_id
            )));
        }

        Ok(())
    }

    #[instrument(skip(self, request), fields(designation = %request.designation))]
    pub async fn create(
        &self,
        request: CreatePlannedItemRequest,
    ) -> Result<PlannedItemResponse, ServiceError> {
        request.validate()?;
        self.check_references(
            request.item_id,
            request.financial_operation_id,
            request.item_status_id,
        )
        .await?;

        let model = planned_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            designation: Set(request.designation),
            unit_cost: Set(request.unit_cost),
            planned_quantity: Set(request.planned_quantity),
            allocated_amount: Set(request.allocated_amount),
            item_id: Set(request.item_id),
            financial_operation_id: Set(request.financial_operation_id),
            item_status_id: Set(request.item_status_id),
            budget_modification_id: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::PlannedItemCreated(created.id)).await {
                warn!(error = %e, planned_item_id = %created.id, "Failed to send planned item created event");
            }
        }

        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<PlannedItemResponse>, ServiceError> {
        let found = PlannedItemEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(Into::into))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdatePlannedItemRequest,
    ) -> Result<PlannedItemResponse, ServiceError> {
        request.validate()?;

        let existing = PlannedItemEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Planned item {} not found", id)))?;

        if let Some(item_status_id) = request.item_status_id {
            let status = ItemStatusEntity::find_by_id(item_status_id)
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if status == 0 {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Item status {} does not exist",
                    item_status_id
                )));
            }
        }

        if let Some(modification_id) = request.budget_modification_id {
            let modification = BudgetModificationEntity::find_by_id(modification_id)
                .count(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if modification == 0 {
                return Err(ServiceError::ReferenceNotFound(format!(
                    "Budget modification {} does not exist",
                    modification_id
                )));
            }
        }

        let mut active: planned_item::ActiveModel = existing.into();
        if let Some(v) = request.designation {
            active.designation = Set(v);
        }
        if let Some(v) = request.unit_cost {
            active.unit_cost = Set(v);
        }
        if let Some(v) = request.planned_quantity {
            active.planned_quantity = Set(v);
        }
        if let Some(v) = request.allocated_amount {
            active.allocated_amount = Set(v);
        }
        if let Some(v) = request.item_status_id {
            active.item_status_id = Set(v);
        }
        if let Some(v) = request.budget_modification_id {
            active.budget_modification_id = Set(Some(v));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::PlannedItemUpdated(id)).await {
                warn!(error = %e, planned_item_id = %id, "Failed to send planned item updated event");
            }
        }

        Ok(updated.into())
    }

    /// Clears the budget-modification link.
    #[instrument(skip(self))]
    pub async fn unlink_budget_modification(
        &self,
        id: Uuid,
    ) -> Result<PlannedItemResponse, ServiceError> {
        let existing = PlannedItemEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Planned item {} not found", id)))?;

        let mut active: planned_item::ActiveModel = existing.into();
        active.budget_modification_id = Set(None);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;
        Ok(updated.into())
    }

    /// Distributions must be removed before the ledger row can go. The
    /// pre-check runs inside the delete transaction, with the RESTRICT
    /// foreign key as backstop.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for planned item delete");
            ServiceError::DatabaseError(e)
        })?;

        let existing = PlannedItemEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Planned item {} not found", id)))?;

        let distributions = ItemDistributionEntity::find()
            .filter(item_distribution::Column::PlannedItemId.eq(id))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if distributions > 0 {
            return Err(ServiceError::Conflict(format!(
                "Planned item {} still has {} distribution(s)",
                id, distributions
            )));
        }

        PlannedItemEntity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::from_delete_err)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::PlannedItemDeleted(id)).await {
                warn!(error = %e, planned_item_id = %id, "Failed to send planned item deleted event");
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<PlannedItemResponse>, u64), ServiceError> {
        let paginator = PlannedItemEntity::find()
            .order_by_desc(planned_item::Column::CreatedAt)
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
    pub async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<PlannedItemResponse>, ServiceError> {
        let rows = PlannedItemEntity::find()
            .filter(planned_item::Column::ItemId.eq(item_id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_by_financial_operation(
        &self,
        financial_operation_id: Uuid,
    ) -> Result<Vec<PlannedItemResponse>, ServiceError> {
        let rows = PlannedItemEntity::find()
            .filter(planned_item::Column::FinancialOperationId.eq(financial_operation_id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_by_status(
        &self,
        item_status_id: Uuid,
    ) -> Result<Vec<PlannedItemResponse>, ServiceError> {
        let rows = PlannedItemEntity::find()
            .filter(planned_item::Column::ItemStatusId.eq(item_status_id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Budget category is derived, not stored, so this filter has to
    /// classify every row at read time.
    #[instrument(skip(self))]
    pub async fn list_by_budget_category(
        &self,
        category: BudgetCategory,
    ) -> Result<Vec<PlannedItemResponse>, ServiceError> {
        let rows = PlannedItemEntity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows
            .into_iter()
            .filter(|row| row.budget_category() == category)
            .map(Into::into)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_by_budget_modification(
        &self,
        budget_modification_id: Uuid,
    ) -> Result<Vec<PlannedItemResponse>, ServiceError> {
        let rows = PlannedItemEntity::find()
            .filter(planned_item::Column::BudgetModificationId.eq(budget_modification_id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Pure reduction over the current row set; no incremental state is
    /// kept anywhere, so repeated calls cannot drift.
    #[instrument(skip(self))]
    pub async fn statistics(&self) -> Result<LedgerStatistics, ServiceError> {
        let rows = PlannedItemEntity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if rows.is_empty() {
            return Ok(LedgerStatistics::default());
        }

        let count = rows.len() as u64;
        let count_dec = Decimal::from(count);

        let mut stats = LedgerStatistics {
            planned_item_count: count,
            ..Default::default()
        };
        let mut unit_cost_sum = Decimal::ZERO;
        let mut quantity_sum = Decimal::ZERO;

        for row in &rows {
            stats.total_allocated += row.allocated_amount;
            stats.total_cost += row.total_cost();
            unit_cost_sum += row.unit_cost;
            quantity_sum += row.planned_quantity;
            stats.max_unit_cost = stats.max_unit_cost.max(row.unit_cost);
            stats.max_allocated_amount = stats.max_allocated_amount.max(row.allocated_amount);
        }

        stats.average_unit_cost = unit_cost_sum / count_dec;
        stats.average_planned_quantity = quantity_sum / count_dec;

        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = PlannedItemEntity::find_by_id(id)
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        PlannedItemEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
