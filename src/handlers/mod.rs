pub mod budget_modifications;
pub mod catalog;
pub mod collaborators;
pub mod distributions;
pub mod financial_operations;
pub mod planned_items;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates the business logic used by HTTP
/// handlers.
#[derive(Clone)]
pub struct AppServices {
    pub domains: Arc<crate::services::catalog::DomainService>,
    pub rubrics: Arc<crate::services::catalog::RubricService>,
    pub items: Arc<crate::services::catalog::ItemService>,
    pub item_statuses: Arc<crate::services::catalog::ItemStatusService>,
    pub budget_types: Arc<crate::services::financial_operations::BudgetTypeService>,
    pub financial_operations: Arc<crate::services::financial_operations::FinancialOperationService>,
    pub planned_items: Arc<crate::services::planned_items::PlannedItemService>,
    pub distributions: Arc<crate::services::distributions::DistributionService>,
    pub budget_modifications: Arc<crate::services::budget_modifications::BudgetModificationService>,
    pub structures: Arc<crate::services::structures::StructureService>,
    pub documents: Arc<crate::services::documents::DocumentService>,
}

impl AppServices {
    /// Build the default services container sharing one pool and one
    /// event channel.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        enforce_distribution_cap: bool,
    ) -> Self {
        let structures = crate::services::structures::StructureService::new(db_pool.clone());

        Self {
            domains: Arc::new(crate::services::catalog::DomainService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            rubrics: Arc::new(crate::services::catalog::RubricService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            items: Arc::new(crate::services::catalog::ItemService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            item_statuses: Arc::new(crate::services::catalog::ItemStatusService::new(
                db_pool.clone(),
            )),
            budget_types: Arc::new(
                crate::services::financial_operations::BudgetTypeService::new(db_pool.clone()),
            ),
            financial_operations: Arc::new(
                crate::services::financial_operations::FinancialOperationService::new(
                    db_pool.clone(),
                    Some(event_sender.clone()),
                ),
            ),
            planned_items: Arc::new(crate::services::planned_items::PlannedItemService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            distributions: Arc::new(crate::services::distributions::DistributionService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
                structures.clone(),
                enforce_distribution_cap,
            )),
            budget_modifications: Arc::new(
                crate::services::budget_modifications::BudgetModificationService::new(
                    db_pool.clone(),
                    Some(event_sender),
                ),
            ),
            structures: Arc::new(structures),
            documents: Arc::new(crate::services::documents::DocumentService::new(db_pool)),
        }
    }
}
