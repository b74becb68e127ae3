use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{AuthorRef, Identified};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub objectives: Vec<String>,
    pub budget: Option<f64>,
    pub timeline: String,
    pub club_id: Uuid,
    pub club_name: String,
    pub submitted_by: AuthorRef,
    pub status: ProposalStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<AuthorRef>,
    pub feedback: Option<String>,
}

impl Identified for Proposal {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::UnderReview => "under_review",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ProposalStatus::Approved | ProposalStatus::Rejected)
    }

    /// `pending -> under_review -> {approved, rejected}`, review may be skipped.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        use ProposalStatus::*;
        matches!(
            (self, next),
            (Pending, UnderReview) | (Pending, Approved) | (Pending, Rejected)
                | (UnderReview, Approved) | (UnderReview, Rejected)
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProposalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "At least one objective is required"))]
    pub objectives: Vec<String>,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,
    #[validate(length(min = 1, message = "Timeline is required"))]
    pub timeline: String,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateProposalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "At least one objective is required"))]
    pub objectives: Option<Vec<String>>,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,
    #[validate(length(min = 1, message = "Timeline is required"))]
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewProposalRequest {
    pub status: ProposalStatus,
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProposalStatus::*;

    const ALL: [ProposalStatus; 4] = [Pending, UnderReview, Approved, Rejected];

    #[test]
    fn test_final_states_are_terminal() {
        for from in [Approved, Rejected] {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn test_review_can_be_skipped() {
        assert!(Pending.can_transition_to(UnderReview));
        assert!(Pending.can_transition_to(Approved));
        assert!(UnderReview.can_transition_to(Rejected));
        assert!(!UnderReview.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }
}
