use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    Extension,
};
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    store::CollectionChanged,
};

/// Whether `user_id` should hear about `change`. Private collections never
/// leave the process and per-user notices only go to their owner.
fn is_for(change: &CollectionChanged, user_id: Uuid) -> bool {
    change.collection.is_public() && change.user_id.map_or(true, |id| id == user_id)
}

/// Server-sent stream of collection change notices.
///
/// Notices carry no entity data; clients re-fetch their own filtered views.
/// A client that falls behind gets a single `resync` event instead of the
/// notices it missed.
pub async fn stream(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = state.service_context.store.subscribe();
    let user_id = current.user.id;
    tracing::debug!(
        user_id = %user_id,
        subscribers = state.service_context.store.subscriber_count(),
        "Change stream opened"
    );

    let events = stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    if !is_for(&change, user_id) {
                        continue;
                    }
                    let event = match SseEvent::default().event("collection_changed").json_data(&change) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Could not encode change notice: {}", e);
                            continue;
                        }
                    };
                    return Some((Ok(event), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(user_id = %user_id, skipped, "Change stream lagged");
                    let event = SseEvent::default().event("resync").data(skipped.to_string());
                    return Some((Ok(event), receiver));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChangeOrigin, CollectionName};

    fn change(collection: CollectionName, user_id: Option<Uuid>) -> CollectionChanged {
        CollectionChanged {
            collection,
            revision: 1,
            origin: ChangeOrigin::Local,
            user_id,
            at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_private_collections_are_not_streamed() {
        let user = Uuid::new_v4();
        assert!(!is_for(&change(CollectionName::Sessions, None), user));
        assert!(!is_for(&change(CollectionName::Users, None), user));
        assert!(is_for(&change(CollectionName::Announcements, None), user));
        assert!(is_for(&change(CollectionName::Events, None), user));
    }

    #[test]
    fn test_read_markers_only_reach_their_owner() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let notice = change(CollectionName::ReadMarkers, Some(owner));

        assert!(is_for(&notice, owner));
        assert!(!is_for(&notice, other));
    }
}
