use async_trait::async_trait;
use crate::error::Result;

pub mod kv_repository;
pub mod memory_repository;

pub use kv_repository::SqliteKeyValueRepository;
pub use memory_repository::InMemoryKeyValueRepository;

/// Opaque string key-value storage backing the entity store.
///
/// Values are whole serialized collections; there is no versioning, so two
/// writers racing on the same key resolve as last-writer-wins.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
