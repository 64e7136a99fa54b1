use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Approval record for a budget change, linking a request document
/// (demande) and an optional response document. There is no status column:
/// the approval state is always derived from approval_date against an
/// as-of date supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "budget_modifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Object is required"))]
    pub object: String,

    pub description: Option<String>,
    pub approval_date: Option<NaiveDate>,

    pub demande_id: Uuid,
    pub response_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::document::Entity",
        from = "Column::DemandeId",
        to = "super::document::Column::Id"
    )]
    Demande,
    #[sea_orm(
        belongs_to = "super::document::Entity",
        from = "Column::ResponseId",
        to = "super::document::Column::Id"
    )]
    Response,
    #[sea_orm(has_many = "super::planned_item::Entity")]
    PlannedItems,
}

impl Related<super::planned_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Derived lifecycle of a modification. Pending → Scheduled happens by
/// setting approval_date; Scheduled → Approved happens by clock advance
/// alone, with no write. There is no rejected or cancelled state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalState {
    Pending,
    Scheduled,
    Approved,
}

impl Model {
    pub fn approval_state(&self, as_of: NaiveDate) -> ApprovalState {
        match self.approval_date {
            None => ApprovalState::Pending,
            Some(date) if date > as_of => ApprovalState::Scheduled,
            Some(_) => ApprovalState::Approved,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.approval_date.is_none()
    }

    pub fn is_scheduled(&self, as_of: NaiveDate) -> bool {
        self.approval_state(as_of) == ApprovalState::Scheduled
    }

    pub fn is_approved(&self, as_of: NaiveDate) -> bool {
        self.approval_state(as_of) == ApprovalState::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modification(approval_date: Option<NaiveDate>) -> Model {
        Model {
            id: Uuid::new_v4(),
            object: "transfer between rubrics".to_string(),
            description: None,
            approval_date,
            demande_id: Uuid::new_v4(),
            response_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn state_is_derived_from_approval_date_and_reference_date() {
        let as_of = date(2024, 6, 15);

        assert_eq!(modification(None).approval_state(as_of), ApprovalState::Pending);
        assert_eq!(
            modification(Some(date(2024, 9, 1))).approval_state(as_of),
            ApprovalState::Scheduled
        );
        assert_eq!(
            modification(Some(date(2024, 3, 1))).approval_state(as_of),
            ApprovalState::Approved
        );
        // The approval day itself counts as approved.
        assert_eq!(
            modification(Some(as_of)).approval_state(as_of),
            ApprovalState::Approved
        );
    }

    #[test]
    fn scheduled_becomes_approved_by_clock_advance_alone() {
        let m = modification(Some(date(2024, 9, 1)));
        assert!(m.is_scheduled(date(2024, 8, 31)));
        assert!(m.is_approved(date(2024, 9, 1)));
    }
}
