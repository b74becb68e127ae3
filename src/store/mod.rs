//! Entity collections persisted as whole blobs in a key-value repository.
//!
//! The store is constructed once at start-up and shared as
//! `Arc<EntityStore>`. Every mutation replaces a whole collection and then
//! publishes a [`CollectionChanged`] notice on the store's channel.

pub mod collection;
pub mod notify;
pub mod sync;

use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    auth::session::Session,
    domain::{
        Announcement, Application, Club, Event, Identified, Proposal, StoredAnnouncement, User,
    },
    error::Result,
    repository::KeyValueRepository,
};

pub use collection::{remove_by_id, replace_by_id, Collection};
pub use notify::{ChangeNotifier, ChangeOrigin, CollectionChanged};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CollectionName {
    Announcements,
    Proposals,
    Events,
    Applications,
    Clubs,
    Users,
    Sessions,
    ReadMarkers,
}

pub const READ_MARKERS_PREFIX: &str = "clubhouse.read_markers:";

impl CollectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Announcements => "announcements",
            CollectionName::Proposals => "proposals",
            CollectionName::Events => "events",
            CollectionName::Applications => "applications",
            CollectionName::Clubs => "clubs",
            CollectionName::Users => "users",
            CollectionName::Sessions => "sessions",
            CollectionName::ReadMarkers => "read_markers",
        }
    }

    /// Well-known repository key. Read markers live under one key per user,
    /// see [`read_markers_key`].
    pub fn key(&self) -> &'static str {
        match self {
            CollectionName::Announcements => "clubhouse.announcements",
            CollectionName::Proposals => "clubhouse.proposals",
            CollectionName::Events => "clubhouse.events",
            CollectionName::Applications => "clubhouse.applications",
            CollectionName::Clubs => "clubhouse.clubs",
            CollectionName::Users => "clubhouse.users",
            CollectionName::Sessions => "clubhouse.sessions",
            CollectionName::ReadMarkers => READ_MARKERS_PREFIX,
        }
    }

    /// Whether clients outside the process should hear about changes.
    pub fn is_public(&self) -> bool {
        !matches!(self, CollectionName::Sessions | CollectionName::Users)
    }
}

pub fn read_markers_key(user_id: Uuid) -> String {
    format!("{}{}", READ_MARKERS_PREFIX, user_id)
}

/// An entity type that lives in its own collection.
pub trait StoredEntity:
    Identified + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const COLLECTION: CollectionName;

    /// Parses a stored blob. The flag is `true` when older records were
    /// upgraded and the blob should be written back.
    fn decode(raw: &str) -> Result<(Vec<Self>, bool)> {
        Ok((serde_json::from_str(raw)?, false))
    }
}

impl StoredEntity for Announcement {
    const COLLECTION: CollectionName = CollectionName::Announcements;

    fn decode(raw: &str) -> Result<(Vec<Self>, bool)> {
        let stored: Vec<StoredAnnouncement> = serde_json::from_str(raw)?;
        let mut migrated = false;
        let mut items = Vec::with_capacity(stored.len());

        for record in stored {
            match record {
                StoredAnnouncement::Current(announcement) => items.push(announcement),
                StoredAnnouncement::Legacy(legacy) => {
                    migrated = true;
                    let id = legacy.id;
                    match legacy.migrate() {
                        Some(announcement) => items.push(announcement),
                        None => tracing::warn!(
                            announcement_id = %id,
                            "Dropping legacy announcement with unrecognised audience"
                        ),
                    }
                }
            }
        }

        Ok((items, migrated))
    }
}

impl StoredEntity for Proposal {
    const COLLECTION: CollectionName = CollectionName::Proposals;
}

impl StoredEntity for Event {
    const COLLECTION: CollectionName = CollectionName::Events;
}

impl StoredEntity for Application {
    const COLLECTION: CollectionName = CollectionName::Applications;
}

impl StoredEntity for Club {
    const COLLECTION: CollectionName = CollectionName::Clubs;
}

impl StoredEntity for User {
    const COLLECTION: CollectionName = CollectionName::Users;
}

impl StoredEntity for Session {
    const COLLECTION: CollectionName = CollectionName::Sessions;
}

pub struct EntityStore {
    repo: Arc<dyn KeyValueRepository>,
    announcements: Collection<Announcement>,
    proposals: Collection<Proposal>,
    events: Collection<Event>,
    applications: Collection<Application>,
    clubs: Collection<Club>,
    users: Collection<User>,
    sessions: Collection<Session>,
    notifier: ChangeNotifier,
}

impl EntityStore {
    /// Builds the store and hydrates every collection from `repo`.
    pub async fn open(repo: Arc<dyn KeyValueRepository>, channel_capacity: usize) -> Result<Self> {
        let store = Self {
            repo,
            announcements: Collection::new(Announcement::COLLECTION),
            proposals: Collection::new(Proposal::COLLECTION),
            events: Collection::new(Event::COLLECTION),
            applications: Collection::new(Application::COLLECTION),
            clubs: Collection::new(Club::COLLECTION),
            users: Collection::new(User::COLLECTION),
            sessions: Collection::new(Session::COLLECTION),
            notifier: ChangeNotifier::new(channel_capacity),
        };

        let repo = store.repo.as_ref();
        store.announcements.reload(repo).await?;
        store.proposals.reload(repo).await?;
        store.events.reload(repo).await?;
        store.applications.reload(repo).await?;
        store.clubs.reload(repo).await?;
        store.users.reload(repo).await?;
        store.sessions.reload(repo).await?;

        tracing::info!(
            announcements = store.announcements.snapshot().await.len(),
            proposals = store.proposals.snapshot().await.len(),
            events = store.events.snapshot().await.len(),
            applications = store.applications.snapshot().await.len(),
            clubs = store.clubs.snapshot().await.len(),
            users = store.users.snapshot().await.len(),
            "Entity store hydrated"
        );

        Ok(store)
    }

    pub fn repo(&self) -> &dyn KeyValueRepository {
        self.repo.as_ref()
    }

    pub fn announcements(&self) -> &Collection<Announcement> {
        &self.announcements
    }

    pub fn proposals(&self) -> &Collection<Proposal> {
        &self.proposals
    }

    pub fn events(&self) -> &Collection<Event> {
        &self.events
    }

    pub fn applications(&self) -> &Collection<Application> {
        &self.applications
    }

    pub fn clubs(&self) -> &Collection<Club> {
        &self.clubs
    }

    pub fn users(&self) -> &Collection<User> {
        &self.users
    }

    pub fn sessions(&self) -> &Collection<Session> {
        &self.sessions
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChanged> {
        self.notifier.subscribe()
    }

    /// Open change subscriptions, including SSE clients.
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    /// Runs the mutation pipeline's compute/persist/broadcast steps for one
    /// collection. Gate and validation belong to the caller and run before.
    pub async fn mutate<T, R, F>(&self, collection: &Collection<T>, f: F) -> Result<R>
    where
        T: StoredEntity,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let (output, revision) = collection.mutate(self.repo(), f).await?;
        self.publish(collection.name(), revision, ChangeOrigin::Local, None);
        Ok(output)
    }

    pub fn publish(
        &self,
        collection: CollectionName,
        revision: u64,
        origin: ChangeOrigin,
        user_id: Option<Uuid>,
    ) {
        self.notifier.notify(CollectionChanged {
            collection,
            revision,
            origin,
            user_id,
            at: Utc::now(),
        });
    }

    /// Empties every collection and deletes all read markers.
    pub async fn clear(&self) -> Result<()> {
        self.clear_one(&self.announcements).await?;
        self.clear_one(&self.proposals).await?;
        self.clear_one(&self.events).await?;
        self.clear_one(&self.applications).await?;
        self.clear_one(&self.clubs).await?;
        self.clear_one(&self.users).await?;
        self.clear_one(&self.sessions).await?;

        let keys = self.repo.keys_with_prefix(READ_MARKERS_PREFIX).await?;
        for key in &keys {
            self.repo.remove(key).await?;
        }
        if !keys.is_empty() {
            self.publish(CollectionName::ReadMarkers, 0, ChangeOrigin::Local, None);
        }

        tracing::info!(read_markers = keys.len(), "Entity store cleared");
        Ok(())
    }

    async fn clear_one<T: StoredEntity>(&self, collection: &Collection<T>) -> Result<()> {
        self.mutate(collection, |items| {
            items.clear();
            Ok(())
        })
        .await
    }

    /// Re-reads every collection and announces the ones another writer
    /// changed. Returns how many changed.
    ///
    /// A collection that cannot be read is logged and skipped; the others
    /// are still checked.
    pub async fn resync(&self) -> usize {
        self.resync_one(&self.announcements).await
            + self.resync_one(&self.proposals).await
            + self.resync_one(&self.events).await
            + self.resync_one(&self.applications).await
            + self.resync_one(&self.clubs).await
            + self.resync_one(&self.users).await
            + self.resync_one(&self.sessions).await
    }

    async fn resync_one<T: StoredEntity>(&self, collection: &Collection<T>) -> usize {
        match collection.reload(self.repo()).await {
            Ok(true) => {}
            Ok(false) => return 0,
            Err(e) => {
                tracing::warn!(
                    collection = collection.name().as_str(),
                    "Resync failed, keeping cached collection: {}",
                    e
                );
                return 0;
            }
        }

        tracing::debug!(
            collection = collection.name().as_str(),
            "Picked up external change"
        );
        let revision = collection.revision().await;
        self.publish(collection.name(), revision, ChangeOrigin::Resync, None);
        1
    }
}
