// Core engine services
pub mod budget_modifications;
pub mod catalog;
pub mod distributions;
pub mod financial_operations;
pub mod planned_items;

// Collaborator lookups (documents, organizational structures)
pub mod documents;
pub mod structures;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Shared validator for monetary and quantity fields: zero is allowed,
/// negatives are not.
pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("must not be negative"));
    }
    Ok(())
}
