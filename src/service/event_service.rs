use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{AuthorRef, CreateEventRequest, Event, UpdateEventRequest, User},
    error::{AppError, Result},
    policy::{ensure, filter_visible, is_visible, Action, EntityKind, Target},
    store::{remove_by_id, EntityStore},
};

/// Who is coming to an event and how many seats remain.
#[derive(Debug, Clone, Serialize)]
pub struct Attendees {
    pub attendees: Vec<AuthorRef>,
    /// `None` for events without a capacity.
    pub spots_left: Option<u32>,
}

pub struct EventService {
    store: Arc<EntityStore>,
}

impl EventService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Soonest first.
    pub async fn list_for(&self, user: &User) -> Vec<Event> {
        let mut visible = filter_visible(self.store.events().snapshot().await.as_slice(), user);
        visible.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        visible
    }

    pub async fn get_for(&self, user: &User, id: Uuid) -> Result<Event> {
        self.store
            .events()
            .find(id)
            .await
            .filter(|e| is_visible(e, user))
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    async fn find(&self, id: Uuid) -> Result<Event> {
        self.store
            .events()
            .find(id)
            .await
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn create(&self, user: &User, request: CreateEventRequest) -> Result<Event> {
        ensure(Action::Create, Target::Kind(EntityKind::Event), user)?;
        request.validate()?;

        // Club leaders organize for their own club unless told otherwise
        let club_id = match request.club_id {
            Some(id) => Some(id),
            None if user.role.capabilities().own_club_events_only => user.club_id(),
            None => None,
        };

        if let Some(id) = club_id {
            if self.store.clubs().find(id).await.is_none() {
                return Err(AppError::Validation(format!("Unknown club {}", id)));
            }
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            starts_at: request.starts_at,
            location: request.location,
            event_type: request.event_type,
            max_attendees: request.max_attendees,
            visibility: request.visibility,
            organizer: user.author_ref(),
            club_id,
            rsvps: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        ensure(Action::Create, Target::Event(&event), user)?;

        let created = event.clone();
        self.store
            .mutate(self.store.events(), move |items| {
                items.push(created);
                Ok(())
            })
            .await?;

        tracing::info!(
            event_id = %event.id,
            organizer_id = %user.id,
            club_id = ?event.club_id,
            "Event created"
        );
        Ok(event)
    }

    pub async fn update(&self, user: &User, id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        let existing = self.find(id).await?;
        ensure(Action::Edit, Target::Event(&existing), user)?;
        request.validate()?;

        let event = self
            .store
            .mutate(self.store.events(), move |items| {
                let event = find_mut(items, id)?;

                if let Some(max) = request.max_attendees {
                    if (max as usize) < event.rsvps.len() {
                        return Err(AppError::Validation(format!(
                            "Capacity {} is below the {} existing RSVPs",
                            max,
                            event.rsvps.len()
                        )));
                    }
                    event.max_attendees = Some(max);
                }
                if let Some(title) = request.title {
                    event.title = title;
                }
                if let Some(description) = request.description {
                    event.description = description;
                }
                if let Some(starts_at) = request.starts_at {
                    event.starts_at = starts_at;
                }
                if let Some(location) = request.location {
                    event.location = location;
                }
                if let Some(event_type) = request.event_type {
                    event.event_type = event_type;
                }
                if let Some(visibility) = request.visibility {
                    event.visibility = visibility;
                }
                event.updated_at = Utc::now();
                Ok(event.clone())
            })
            .await?;

        tracing::info!(event_id = %id, editor_id = %user.id, "Event updated");
        Ok(event)
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let existing = self.find(id).await?;
        ensure(Action::Delete, Target::Event(&existing), user)?;

        self.store
            .mutate(self.store.events(), move |items| {
                remove_by_id(items, id, "Event").map(|_| ())
            })
            .await?;

        tracing::info!(event_id = %id, deleted_by = %user.id, "Event deleted");
        Ok(())
    }

    /// Registers `user`. Repeating an RSVP is a no-op; a full event rejects
    /// new RSVPs and leaves the list unchanged.
    pub async fn rsvp(&self, user: &User, id: Uuid) -> Result<Event> {
        let existing = self.get_for(user, id).await?;
        ensure(Action::Rsvp, Target::Event(&existing), user)?;

        let user_id = user.id;
        let event = self
            .store
            .mutate(self.store.events(), move |items| {
                let event = find_mut(items, id)?;
                if event.has_rsvp(user_id) {
                    return Ok(event.clone());
                }
                if event.is_full() {
                    return Err(AppError::CapacityExceeded(format!(
                        "Event is full ({} attendees)",
                        event.rsvps.len()
                    )));
                }
                event.rsvps.push(user_id);
                Ok(event.clone())
            })
            .await?;

        tracing::info!(event_id = %id, user_id = %user.id, "RSVP recorded");
        Ok(event)
    }

    pub async fn cancel_rsvp(&self, user: &User, id: Uuid) -> Result<Event> {
        self.get_for(user, id).await?;

        let user_id = user.id;
        let event = self
            .store
            .mutate(self.store.events(), move |items| {
                let event = find_mut(items, id)?;
                event.rsvps.retain(|u| *u != user_id);
                Ok(event.clone())
            })
            .await?;

        tracing::info!(event_id = %id, user_id = %user.id, "RSVP cancelled");
        Ok(event)
    }

    /// Directory entries for everyone who RSVP'd, in RSVP order.
    pub async fn attendees(&self, user: &User, id: Uuid) -> Result<Attendees> {
        let event = self.get_for(user, id).await?;
        let users = self.store.users().snapshot().await;

        let attendees = event
            .rsvps
            .iter()
            .filter_map(|rsvp| users.iter().find(|u| u.id == *rsvp))
            .map(User::author_ref)
            .collect();

        Ok(Attendees {
            attendees,
            spots_left: event.spots_left(),
        })
    }
}

fn find_mut(items: &mut [Event], id: Uuid) -> Result<&mut Event> {
    items
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}
