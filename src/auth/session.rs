use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::Identified,
    error::Result,
    store::EntityStore,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl Identified for Session {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Sessions kept in the entity store's `sessions` collection.
pub struct SessionStore {
    store: Arc<EntityStore>,
}

impl SessionStore {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash_token(token),
            expires_at,
            created_at: now,
            last_used_at: now,
        };

        let created = session.clone();
        self.store
            .mutate(self.store.sessions(), move |sessions| {
                sessions.push(created);
                Ok(())
            })
            .await?;

        Ok(session)
    }

    /// Looks up an unexpired session. Does not write `last_used_at` back, so
    /// authenticated reads never rewrite the sessions blob.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let token_hash = hash_token(token);
        let now = Utc::now();

        let session = self
            .store
            .sessions()
            .snapshot()
            .await
            .iter()
            .find(|s| s.token_hash == token_hash && s.expires_at > now)
            .cloned()
            .map(|mut s| {
                s.last_used_at = now;
                s
            });

        Ok(session)
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        let token_hash = hash_token(token);

        self.store
            .mutate(self.store.sessions(), move |sessions| {
                sessions.retain(|s| s.token_hash != token_hash);
                Ok(())
            })
            .await
    }

    pub async fn cleanup_expired(&self) -> Result<u64> {
        let now = Utc::now();

        self.store
            .mutate(self.store.sessions(), move |sessions| {
                let before = sessions.len();
                sessions.retain(|s| s.expires_at > now);
                Ok((before - sessions.len()) as u64)
            })
            .await
    }
}

pub(crate) fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hashing() {
        let token = "test_token";
        let hash1 = hash_token(token);
        let hash2 = hash_token(token);
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, token);
        assert_eq!(hash1.len(), 64);
    }
}
