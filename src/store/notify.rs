use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::CollectionName;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// A mutation applied by this process.
    Local,
    /// A write by another process, picked up by the resync loop.
    Resync,
}

/// Notice that a collection was replaced. Carries no data: receivers re-query
/// through the visibility filter.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionChanged {
    pub collection: CollectionName,
    pub revision: u64,
    pub origin: ChangeOrigin,
    /// Set for per-user collections such as read markers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

/// The single "collection changed" channel owned by the entity store.
///
/// Delivery is at-most-eventual. A subscriber that falls more than the
/// channel capacity behind skips the notices it missed and should treat the
/// lag itself as "something changed".
pub struct ChangeNotifier {
    sender: broadcast::Sender<CollectionChanged>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChanged> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers were reached.
    pub fn notify(&self, change: CollectionChanged) -> usize {
        tracing::debug!(
            collection = change.collection.as_str(),
            revision = change.revision,
            origin = ?change.origin,
            "Collection changed"
        );
        // No subscribers is not an error
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
