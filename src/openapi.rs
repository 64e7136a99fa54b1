use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Budget Planning API",
        version = "0.3.0",
        description = "Administrative budget planning: classification catalog, planned expenditure ledger, structure-level distribution and budget modification approval tracking."
    ),
    paths(
        handlers::catalog::create_domain,
        handlers::catalog::get_domain,
        handlers::catalog::list_domains,
        handlers::catalog::update_domain,
        handlers::catalog::delete_domain,
        handlers::catalog::create_rubric,
        handlers::catalog::get_rubric,
        handlers::catalog::list_rubrics,
        handlers::catalog::update_rubric,
        handlers::catalog::delete_rubric,
        handlers::catalog::create_item,
        handlers::catalog::get_item,
        handlers::catalog::list_items,
        handlers::catalog::update_item,
        handlers::catalog::delete_item,
        handlers::catalog::create_item_status,
        handlers::catalog::get_item_status,
        handlers::catalog::list_item_statuses,
        handlers::catalog::update_item_status,
        handlers::catalog::delete_item_status,
        handlers::financial_operations::create_financial_operation,
        handlers::financial_operations::get_financial_operation,
        handlers::financial_operations::list_financial_operations,
        handlers::financial_operations::update_financial_operation,
        handlers::financial_operations::delete_financial_operation,
        handlers::financial_operations::create_budget_type,
        handlers::financial_operations::list_budget_types,
        handlers::planned_items::create_planned_item,
        handlers::planned_items::get_planned_item,
        handlers::planned_items::list_planned_items,
        handlers::planned_items::update_planned_item,
        handlers::planned_items::delete_planned_item,
        handlers::planned_items::unlink_budget_modification,
        handlers::planned_items::ledger_statistics,
        handlers::distributions::allocate,
        handlers::distributions::get_distribution,
        handlers::distributions::update_distribution,
        handlers::distributions::delete_distribution,
        handlers::distributions::list_by_planned_item,
        handlers::distributions::list_by_structure,
        handlers::distributions::list_by_organizational_ancestor,
        handlers::distributions::over_distribution_report,
        handlers::distributions::coordination_report,
        handlers::distributions::structure_summary,
        handlers::budget_modifications::create_budget_modification,
        handlers::budget_modifications::get_budget_modification,
        handlers::budget_modifications::list_budget_modifications,
        handlers::budget_modifications::update_budget_modification,
        handlers::budget_modifications::delete_budget_modification,
        handlers::budget_modifications::approval_buckets,
        handlers::collaborators::create_structure,
        handlers::collaborators::get_structure,
        handlers::collaborators::list_structures,
        handlers::collaborators::create_document,
        handlers::collaborators::get_document,
    ),
    tags(
        (name = "catalog", description = "Domain / rubric / item classification hierarchy"),
        (name = "financial-operations", description = "Financial operation registry"),
        (name = "planned-items", description = "Planned expenditure ledger"),
        (name = "distributions", description = "Distribution allocator"),
        (name = "reports", description = "Read-side consistency reports"),
        (name = "budget-modifications", description = "Budget modification approval tracker"),
        (name = "collaborators", description = "Structure and document collaborators"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted beside the API.
pub fn swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
