use crate::{
    db::DbPool,
    entities::item_distribution::{
        self, DistributionCoverage, Entity as ItemDistributionEntity,
        Model as ItemDistributionModel,
    },
    entities::planned_item::{self, Entity as PlannedItemEntity, Model as PlannedItemModel},
    entities::structure::{self, Entity as StructureEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::structures::StructureService,
    services::validate_non_negative,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strum::Display;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AllocateDistributionRequest {
    pub planned_item_id: Uuid,
    pub structure_id: Uuid,
    #[validate(custom = "validate_non_negative")]
    pub quantity: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDistributionRequest {
    #[validate(custom = "validate_non_negative")]
    pub quantity: Decimal,
}

/// Distribution row joined with the derived values a caller needs to act
/// on it: coverage against the plan, cost attribution and plan share.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DistributionResponse {
    pub id: Uuid,
    pub planned_item_id: Uuid,
    pub structure_id: Uuid,
    pub quantity: Decimal,
    pub coverage: DistributionCoverage,
    /// quantity × the parent's unit cost. Cost attribution follows unit
    /// cost; budget attribution follows allocated amount.
    pub distributed_cost: Decimal,
    /// Share of the parent's planned quantity; None when the plan is zero.
    pub percent_of_plan: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DistributionResponse {
    fn from_parts(model: ItemDistributionModel, parent: &PlannedItemModel) -> Self {
        Self {
            coverage: model.coverage(parent.planned_quantity),
            distributed_cost: model.distributed_cost(parent.unit_cost),
            percent_of_plan: model.percent_of_plan(parent.planned_quantity),
            id: model.id,
            planned_item_id: model.planned_item_id,
            structure_id: model.structure_id,
            quantity: model.quantity,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinationStatus {
    SingleDistribution,
    RequiresCoordination,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CoordinationEntry {
    pub planned_item_id: Uuid,
    pub designation: String,
    pub distribution_count: u64,
    pub status: CoordinationStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OverDistributionEntry {
    pub planned_item_id: Uuid,
    pub designation: String,
    pub planned_quantity: Decimal,
    pub distributed_quantity: Decimal,
    pub excess: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StructureSummaryEntry {
    pub structure_id: Uuid,
    pub structure_name: String,
    pub distribution_count: u64,
    pub total_quantity: Decimal,
    pub total_cost: Decimal,
}

/// Allocator splitting planned quantities across organizational
/// structures. Writes never enforce the per-planned-item quantity cap
/// unless the deployment opts in; violations surface through the
/// read-side over-distribution report instead.
#[derive(Clone)]
pub struct DistributionService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    structures: StructureService,
    enforce_cap: bool,
}

impl DistributionService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        structures: StructureService,
        enforce_cap: bool,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            structures,
            enforce_cap,
        }
    }

    async fn parent(&self, planned_item_id: Uuid) -> Result<PlannedItemModel, ServiceError> {
        PlannedItemEntity::find_by_id(planned_item_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!(
                    "Planned item {} does not exist",
                    planned_item_id
                ))
            })
    }

    async fn distributed_sum(&self, planned_item_id: Uuid) -> Result<Decimal, ServiceError> {
        let rows = ItemDistributionEntity::find()
            .filter(item_distribution::Column::PlannedItemId.eq(planned_item_id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(rows.iter().map(|row| row.quantity).sum())
    }

    /// Creates a distribution row. Two identical calls create two rows;
    /// the model allows several distributions per (planned item,
    /// structure) pair and rebalancing relies on it.
    #[instrument(skip(self, request), fields(planned_item_id = %request.planned_item_id, structure_id = %request.structure_id))]
    pub async fn allocate(
        &self,
        request: AllocateDistributionRequest,
    ) -> Result<DistributionResponse, ServiceError> {
        request.validate()?;

        let parent = self.parent(request.planned_item_id).await?;

        if !self.structures.exists(request.structure_id).await? {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Structure {} does not exist",
                request.structure_id
            )));
        }

        if self.enforce_cap {
            let already = self.distributed_sum(request.planned_item_id).await?;
            if already + request.quantity > parent.planned_quantity {
                return Err(ServiceError::ValidationError(format!(
                    "Distribution cap enforced: {} + {} exceeds planned quantity {}",
                    already, request.quantity, parent.planned_quantity
                )));
            }
        }

        let model = item_distribution::ActiveModel {
            id: Set(Uuid::new_v4()),
            quantity: Set(request.quantity),
            planned_item_id: Set(request.planned_item_id),
            structure_id: Set(request.structure_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::DistributionCreated {
                    distribution_id: created.id,
                    planned_item_id: created.planned_item_id,
                    structure_id: created.structure_id,
                })
                .await
            {
                warn!(error = %e, distribution_id = %created.id, "Failed to send distribution created event");
            }
        }

        Ok(DistributionResponse::from_parts(created, &parent))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<DistributionResponse>, ServiceError> {
        let found = ItemDistributionEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        match found {
            Some(model) => {
                let parent = self.parent(model.planned_item_id).await?;
                Ok(Some(DistributionResponse::from_parts(model, &parent)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDistributionRequest,
    ) -> Result<DistributionResponse, ServiceError> {
        request.validate()?;

        let existing = ItemDistributionEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Distribution {} not found", id)))?;

        let parent = self.parent(existing.planned_item_id).await?;

        if self.enforce_cap {
            let others = self.distributed_sum(existing.planned_item_id).await? - existing.quantity;
            if others + request.quantity > parent.planned_quantity {
                return Err(ServiceError::ValidationError(format!(
                    "Distribution cap enforced: {} + {} exceeds planned quantity {}",
                    others, request.quantity, parent.planned_quantity
                )));
            }
        }

        let mut active: item_distribution::ActiveModel = existing.into();
        active.quantity = Set(request.quantity);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::from_write_err)?;

        Ok(DistributionResponse::from_parts(updated, &parent))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = ItemDistributionEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::from_delete_err)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Distribution {} not found",
                id
            )));
        }

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::DistributionDeleted(id)).await {
                warn!(error = %e, distribution_id = %id, "Failed to send distribution deleted event");
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_by_planned_item(
        &self,
        planned_item_id: Uuid,
    ) -> Result<Vec<DistributionResponse>, ServiceError> {
        let parent = self.parent(planned_item_id).await?;

        let rows = ItemDistributionEntity::find()
            .filter(item_distribution::Column::PlannedItemId.eq(planned_item_id))
            .order_by_asc(item_distribution::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|row| DistributionResponse::from_parts(row, &parent))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_by_structure(
        &self,
        structure_id: Uuid,
    ) -> Result<Vec<DistributionResponse>, ServiceError> {
        if !self.structures.exists(structure_id).await? {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Structure {} does not exist",
                structure_id
            )));
        }

        let rows = ItemDistributionEntity::find()
            .filter(item_distribution::Column::StructureId.eq(structure_id))
            .order_by_asc(item_distribution::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        self.join_parents(rows).await
    }

    /// Distributions for a structure together with its whole subtree.
    #[instrument(skip(self))]
    pub async fn list_by_organizational_ancestor(
        &self,
        structure_id: Uuid,
    ) -> Result<Vec<DistributionResponse>, ServiceError> {
        let scope = self.structures.descendant_ids(structure_id).await?;

        let rows = ItemDistributionEntity::find()
            .filter(item_distribution::Column::StructureId.is_in(scope))
            .order_by_asc(item_distribution::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        self.join_parents(rows).await
    }

    async fn join_parents(
        &self,
        rows: Vec<ItemDistributionModel>,
    ) -> Result<Vec<DistributionResponse>, ServiceError> {
        let parent_ids: Vec<Uuid> = rows.iter().map(|row| row.planned_item_id).collect();
        let parents: HashMap<Uuid, PlannedItemModel> = PlannedItemEntity::find()
            .filter(planned_item::Column::Id.is_in(parent_ids))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|parent| (parent.id, parent))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                parents
                    .get(&row.planned_item_id)
                    .map(|parent| DistributionResponse::from_parts(row, parent))
            })
            .collect())
    }

    /// Planned items whose distributed quantity exceeds the plan. Purely
    /// read-side: the offending rows persist untouched.
    #[instrument(skip(self))]
    pub async fn over_distribution_report(
        &self,
    ) -> Result<Vec<OverDistributionEntry>, ServiceError> {
        let distributions = ItemDistributionEntity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut sums: HashMap<Uuid, Decimal> = HashMap::new();
        for row in &distributions {
            *sums.entry(row.planned_item_id).or_default() += row.quantity;
        }

        let parents = PlannedItemEntity::find()
            .filter(planned_item::Column::Id.is_in(sums.keys().copied().collect::<Vec<_>>()))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut report: Vec<OverDistributionEntry> = parents
            .into_iter()
            .filter_map(|parent| {
                let distributed = sums.get(&parent.id).copied().unwrap_or_default();
                if distributed > parent.planned_quantity {
                    Some(OverDistributionEntry {
                        excess: distributed - parent.planned_quantity,
                        planned_item_id: parent.id,
                        designation: parent.designation,
                        planned_quantity: parent.planned_quantity,
                        distributed_quantity: distributed,
                    })
                } else {
                    None
                }
            })
            .collect();

        report.sort_by(|a, b| b.excess.cmp(&a.excess));
        Ok(report)
    }

    /// Planned items with more than one distribution need coordination
    /// between the receiving structures.
    #[instrument(skip(self))]
    pub async fn coordination_report(&self) -> Result<Vec<CoordinationEntry>, ServiceError> {
        let distributions = ItemDistributionEntity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for row in &distributions {
            *counts.entry(row.planned_item_id).or_default() += 1;
        }

        let parents = PlannedItemEntity::find()
            .filter(planned_item::Column::Id.is_in(counts.keys().copied().collect::<Vec<_>>()))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut report: Vec<CoordinationEntry> = parents
            .into_iter()
            .map(|parent| {
                let count = counts.get(&parent.id).copied().unwrap_or_default();
                CoordinationEntry {
                    planned_item_id: parent.id,
                    designation: parent.designation,
                    distribution_count: count,
                    status: if count > 1 {
                        CoordinationStatus::RequiresCoordination
                    } else {
                        CoordinationStatus::SingleDistribution
                    },
                }
            })
            .collect();

        report.sort_by(|a, b| b.distribution_count.cmp(&a.distribution_count));
        Ok(report)
    }

    /// Per-structure reduction over distributions joined to their parents.
    #[instrument(skip(self))]
    pub async fn structure_summary(&self) -> Result<Vec<StructureSummaryEntry>, ServiceError> {
        let distributions = ItemDistributionEntity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let parent_ids: Vec<Uuid> = distributions
            .iter()
            .map(|row| row.planned_item_id)
            .collect();
        let parents: HashMap<Uuid, PlannedItemModel> = PlannedItemEntity::find()
            .filter(planned_item::Column::Id.is_in(parent_ids))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|parent| (parent.id, parent))
            .collect();

        struct Accumulator {
            count: u64,
            quantity: Decimal,
            cost: Decimal,
        }

        let mut by_structure: HashMap<Uuid, Accumulator> = HashMap::new();
        for row in &distributions {
            let Some(parent) = parents.get(&row.planned_item_id) else {
                continue;
            };
            let acc = by_structure.entry(row.structure_id).or_insert(Accumulator {
                count: 0,
                quantity: Decimal::ZERO,
                cost: Decimal::ZERO,
            });
            acc.count += 1;
            acc.quantity += row.quantity;
            acc.cost += row.distributed_cost(parent.unit_cost);
        }

        let names: HashMap<Uuid, String> = StructureEntity::find()
            .filter(structure::Column::Id.is_in(by_structure.keys().copied().collect::<Vec<_>>()))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|row| (row.id, row.name))
            .collect();

        let mut report: Vec<StructureSummaryEntry> = by_structure
            .into_iter()
            .map(|(structure_id, acc)| StructureSummaryEntry {
                structure_id,
                structure_name: names.get(&structure_id).cloned().unwrap_or_default(),
                distribution_count: acc.count,
                total_quantity: acc.quantity,
                total_cost: acc.cost,
            })
            .collect();

        report.sort_by(|a, b| b.total_cost.cmp(&a.total_cost));
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<u64, ServiceError> {
        ItemDistributionEntity::find()
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
