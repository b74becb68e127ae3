use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{AuthorRef, Identified};

/// A request to join a club.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub id: Uuid,
    pub applicant: AuthorRef,
    pub applicant_email: String,
    pub club_id: Uuid,
    pub motivation: String,
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub status: ApplicationStatus,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<AuthorRef>,
}

impl Application {
    /// Pending and approved applications block a new one for the same club.
    pub fn blocks_resubmission(&self) -> bool {
        matches!(self.status, ApplicationStatus::Pending | ApplicationStatus::Approved)
    }
}

impl Identified for Application {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Approved)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitApplicationRequest {
    pub club_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "Motivation must be 1-2000 characters"))]
    pub motivation: String,
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewApplicationRequest {
    pub status: ApplicationStatus,
    pub feedback: Option<String>,
}
