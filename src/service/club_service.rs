use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::Club,
    error::{AppError, Result},
    store::EntityStore,
};

/// Read-only access to the club directory.
pub struct ClubService {
    store: Arc<EntityStore>,
}

impl ClubService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// All clubs, by name.
    pub async fn list(&self) -> Vec<Club> {
        let mut clubs = self.store.clubs().snapshot().await.to_vec();
        clubs.sort_by(|a, b| a.name.cmp(&b.name));
        clubs
    }

    pub async fn list_by_category(&self, category: &str) -> Vec<Club> {
        self.list()
            .await
            .into_iter()
            .filter(|c| c.category.eq_ignore_ascii_case(category))
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Club> {
        self.store
            .clubs()
            .find(id)
            .await
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))
    }
}
