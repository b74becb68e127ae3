use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    domain::Identified,
    error::Result,
    store::{read_markers_key, ChangeOrigin, CollectionName, EntityStore},
};

/// An entity with its per-user read flag merged in.
#[derive(Debug, Clone, Serialize)]
pub struct Read<T> {
    #[serde(flatten)]
    pub item: T,
    pub read: bool,
}

/// Per-user sets of read entity ids.
///
/// Markers live under their own key per user and never touch the entities
/// themselves. Counts are always derived from the marker set and the
/// caller's visible entities; nothing is stored redundantly.
pub struct ReadStateService {
    store: Arc<EntityStore>,
    /// Last markers successfully read or written, per user.
    cache: Mutex<HashMap<Uuid, BTreeSet<Uuid>>>,
}

impl ReadStateService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn markers(&self, user_id: Uuid) -> Result<BTreeSet<Uuid>> {
        let mut cache = self.cache.lock().await;
        self.load(&mut cache, user_id).await
    }

    async fn load(
        &self,
        cache: &mut HashMap<Uuid, BTreeSet<Uuid>>,
        user_id: Uuid,
    ) -> Result<BTreeSet<Uuid>> {
        let raw = self.store.repo().get(&read_markers_key(user_id)).await?;

        let markers = match raw {
            None => BTreeSet::new(),
            Some(blob) => match serde_json::from_str::<BTreeSet<Uuid>>(&blob) {
                Ok(markers) => markers,
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        "Could not decode read markers, keeping last known good: {}",
                        e
                    );
                    return Ok(cache.get(&user_id).cloned().unwrap_or_default());
                }
            },
        };

        cache.insert(user_id, markers.clone());
        Ok(markers)
    }

    async fn update<F>(&self, user_id: Uuid, f: F) -> Result<bool>
    where
        F: FnOnce(&mut BTreeSet<Uuid>) -> bool,
    {
        let mut cache = self.cache.lock().await;
        let mut markers = self.load(&mut cache, user_id).await?;

        if !f(&mut markers) {
            return Ok(false);
        }

        let raw = serde_json::to_string(&markers)?;
        self.store.repo().set(&read_markers_key(user_id), &raw).await?;
        cache.insert(user_id, markers);

        self.store.publish(
            CollectionName::ReadMarkers,
            0,
            ChangeOrigin::Local,
            Some(user_id),
        );
        Ok(true)
    }

    /// Idempotent. Returns whether the marker set changed.
    pub async fn mark_read(&self, entity_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.update(user_id, |markers| markers.insert(entity_id)).await
    }

    /// Idempotent. Returns whether the marker set changed.
    pub async fn mark_unread(&self, entity_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.update(user_id, |markers| markers.remove(&entity_id)).await
    }

    pub async fn is_read(&self, entity_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.markers(user_id).await?.contains(&entity_id))
    }

    pub async fn unread_count<T: Identified>(&self, user_id: Uuid, visible: &[T]) -> Result<usize> {
        let markers = self.markers(user_id).await?;
        Ok(unread_count(&markers, visible))
    }

    pub async fn with_read_flags<T: Identified>(
        &self,
        user_id: Uuid,
        items: Vec<T>,
    ) -> Result<Vec<Read<T>>> {
        let markers = self.markers(user_id).await?;
        Ok(items
            .into_iter()
            .map(|item| Read {
                read: markers.contains(&item.id()),
                item,
            })
            .collect())
    }
}

/// `|visible| - |visible ∩ markers|`.
pub fn unread_count<T: Identified>(markers: &BTreeSet<Uuid>, visible: &[T]) -> usize {
    let read = visible
        .iter()
        .filter(|item| markers.contains(&item.id()))
        .count();
    visible.len() - read
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(Uuid);

    impl Identified for Item {
        fn id(&self) -> Uuid {
            self.0
        }
    }

    #[test]
    fn test_unread_count_ignores_markers_outside_visible_set() {
        let visible: Vec<Item> = (0..4).map(|_| Item(Uuid::new_v4())).collect();
        let markers: BTreeSet<Uuid> = [visible[0].0, visible[2].0, Uuid::new_v4()]
            .into_iter()
            .collect();

        assert_eq!(unread_count(&markers, &visible), 2);
        assert_eq!(unread_count(&BTreeSet::new(), &visible), 4);
        assert_eq!(unread_count::<Item>(&markers, &[]), 0);
    }
}
