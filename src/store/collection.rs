use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{CollectionName, StoredEntity};
use crate::{error::Result, repository::KeyValueRepository};

struct State<T> {
    items: Arc<Vec<T>>,
    /// Blob last read from or written to the repository.
    raw: Option<String>,
    revision: u64,
}

/// In-memory cache of one persisted collection.
///
/// Writers go through [`Collection::mutate`], which works on a copy and only
/// swaps it in after the whole collection has been persisted, so readers
/// never observe a half-applied change.
pub struct Collection<T> {
    name: CollectionName,
    state: RwLock<State<T>>,
    write_lock: Mutex<()>,
}

impl<T: StoredEntity> Collection<T> {
    pub fn new(name: CollectionName) -> Self {
        Self {
            name,
            state: RwLock::new(State {
                items: Arc::new(Vec::new()),
                raw: None,
                revision: 0,
            }),
            write_lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> CollectionName {
        self.name
    }

    pub async fn snapshot(&self) -> Arc<Vec<T>> {
        self.state.read().await.items.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<T> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision
    }

    /// Re-hydrates from the repository. Returns whether the cached
    /// collection changed.
    ///
    /// An unparseable blob leaves the last known good collection in place.
    pub async fn reload(&self, repo: &dyn KeyValueRepository) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let key = self.name.key();
        let raw = repo.get(key).await?;

        if raw == self.state.read().await.raw {
            return Ok(false);
        }

        let (items, migrated) = match raw.as_deref() {
            None => (Vec::new(), false),
            Some(blob) => match T::decode(blob) {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::warn!(
                        collection = self.name.as_str(),
                        "Could not decode stored collection, keeping last known good: {}",
                        e
                    );
                    return Ok(false);
                }
            },
        };

        let raw = if migrated {
            let canonical = serde_json::to_string(&items)?;
            repo.set(key, &canonical).await?;
            tracing::info!(
                collection = self.name.as_str(),
                count = items.len(),
                "Migrated stored collection to current layout"
            );
            Some(canonical)
        } else {
            raw
        };

        let mut state = self.state.write().await;
        state.items = Arc::new(items);
        state.raw = raw;
        state.revision += 1;
        Ok(true)
    }

    /// Applies `f` to a copy of the collection, persists the result and
    /// swaps it in. If `f` or the write fails nothing changes.
    ///
    /// Returns `f`'s output and the new revision.
    pub async fn mutate<R, F>(&self, repo: &dyn KeyValueRepository, f: F) -> Result<(R, u64)>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.write_lock.lock().await;

        let mut items = Vec::clone(&self.state.read().await.items);
        let output = f(&mut items)?;

        let raw = serde_json::to_string(&items)?;
        repo.set(self.name.key(), &raw).await?;

        let mut state = self.state.write().await;
        state.items = Arc::new(items);
        state.raw = Some(raw);
        state.revision += 1;
        Ok((output, state.revision))
    }
}

/// Replaces the element with the same id. Errors with `NotFound` when absent.
pub fn replace_by_id<T: StoredEntity>(items: &mut [T], item: T, what: &str) -> Result<()> {
    let slot = items
        .iter_mut()
        .find(|existing| existing.id() == item.id())
        .ok_or_else(|| crate::error::AppError::NotFound(format!("{} not found", what)))?;
    *slot = item;
    Ok(())
}

/// Removes and returns the element with `id`. Errors with `NotFound` when absent.
pub fn remove_by_id<T: StoredEntity>(items: &mut Vec<T>, id: Uuid, what: &str) -> Result<T> {
    let index = items
        .iter()
        .position(|existing| existing.id() == id)
        .ok_or_else(|| crate::error::AppError::NotFound(format!("{} not found", what)))?;
    Ok(items.remove(index))
}
