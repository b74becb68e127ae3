use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{AuthorRef, Identified};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub event_type: EventType,
    pub max_attendees: Option<u32>,
    pub visibility: EventVisibility,
    pub organizer: AuthorRef,
    /// `None` means the event is organization-wide.
    pub club_id: Option<Uuid>,
    #[serde(default)]
    pub rsvps: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn has_rsvp(&self, user_id: Uuid) -> bool {
        self.rsvps.contains(&user_id)
    }

    pub fn is_full(&self) -> bool {
        self.max_attendees
            .map(|max| self.rsvps.len() >= max as usize)
            .unwrap_or(false)
    }

    pub fn spots_left(&self) -> Option<u32> {
        self.max_attendees
            .map(|max| max.saturating_sub(self.rsvps.len() as u32))
    }
}

impl Identified for Event {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Meeting,
    Workshop,
    Social,
    Competition,
    Cultural,
    Sports,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventVisibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub event_type: EventType,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub max_attendees: Option<u32>,
    pub visibility: EventVisibility,
    pub club_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: Option<String>,
    pub event_type: Option<EventType>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub max_attendees: Option<u32>,
    pub visibility: Option<EventVisibility>,
}
