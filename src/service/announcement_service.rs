use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest, User},
    error::{AppError, Result},
    policy::{ensure, filter_visible, is_visible, Action, EntityKind, Target},
    service::read_state_service::{Read, ReadStateService},
    store::{remove_by_id, replace_by_id, EntityStore},
};

pub struct AnnouncementService {
    store: Arc<EntityStore>,
    read_state: Arc<ReadStateService>,
}

impl AnnouncementService {
    pub fn new(store: Arc<EntityStore>, read_state: Arc<ReadStateService>) -> Self {
        Self { store, read_state }
    }

    /// Announcements `user` may see, important first, then newest first.
    pub async fn visible_to(&self, user: &User) -> Vec<Announcement> {
        let mut visible = filter_visible(self.store.announcements().snapshot().await.as_slice(), user);
        visible.sort_by(|a, b| {
            b.important
                .cmp(&a.important)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        visible
    }

    pub async fn list_for(&self, user: &User) -> Result<Vec<Read<Announcement>>> {
        let visible = self.visible_to(user).await;
        self.read_state.with_read_flags(user.id, visible).await
    }

    /// Invisible announcements are reported as missing.
    pub async fn get_for(&self, user: &User, id: Uuid) -> Result<Read<Announcement>> {
        let announcement = self.find_visible(user, id).await?;
        let read = self.read_state.is_read(id, user.id).await?;
        Ok(Read { item: announcement, read })
    }

    async fn find_visible(&self, user: &User, id: Uuid) -> Result<Announcement> {
        self.store
            .announcements()
            .find(id)
            .await
            .filter(|a| is_visible(a, user))
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }

    pub async fn create(&self, user: &User, request: CreateAnnouncementRequest) -> Result<Announcement> {
        ensure(Action::Create, Target::Kind(EntityKind::Announcement), user)?;
        request.validate()?;

        let now = Utc::now();
        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: request.title,
            content: request.content,
            author: user.author_ref(),
            target: request.target,
            important: request.important,
            created_at: now,
            updated_at: now,
        };

        // The role may announce, now check it may reach this audience
        ensure(Action::Create, Target::Announcement(&announcement), user)?;
        announcement.target.validate()?;

        let created = announcement.clone();
        self.store
            .mutate(self.store.announcements(), move |items| {
                items.push(created);
                Ok(())
            })
            .await?;

        tracing::info!(
            announcement_id = %announcement.id,
            author_id = %user.id,
            "Announcement created"
        );
        Ok(announcement)
    }

    pub async fn update(
        &self,
        user: &User,
        id: Uuid,
        request: UpdateAnnouncementRequest,
    ) -> Result<Announcement> {
        let mut announcement = self
            .store
            .announcements()
            .find(id)
            .await
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        ensure(Action::Edit, Target::Announcement(&announcement), user)?;
        request.validate()?;

        if let Some(title) = request.title {
            announcement.title = title;
        }
        if let Some(content) = request.content {
            announcement.content = content;
        }
        if let Some(important) = request.important {
            announcement.important = important;
        }
        if let Some(target) = request.target {
            announcement.target = target;
            if !user.role.is_top_admin() {
                ensure(Action::Create, Target::Announcement(&announcement), user)?;
            }
        }
        announcement.target.validate()?;
        announcement.updated_at = Utc::now();

        let updated = announcement.clone();
        self.store
            .mutate(self.store.announcements(), move |items| {
                replace_by_id(items, updated, "Announcement")
            })
            .await?;

        tracing::info!(announcement_id = %id, editor_id = %user.id, "Announcement updated");
        Ok(announcement)
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        let announcement = self
            .store
            .announcements()
            .find(id)
            .await
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        ensure(Action::Delete, Target::Announcement(&announcement), user)?;

        self.store
            .mutate(self.store.announcements(), move |items| {
                remove_by_id(items, id, "Announcement").map(|_| ())
            })
            .await?;

        tracing::info!(announcement_id = %id, deleted_by = %user.id, "Announcement deleted");
        Ok(())
    }

    pub async fn unread_count(&self, user: &User) -> Result<usize> {
        let visible = self.visible_to(user).await;
        self.read_state.unread_count(user.id, &visible).await
    }

    pub async fn mark_read(&self, user: &User, id: Uuid) -> Result<bool> {
        self.find_visible(user, id).await?;
        self.read_state.mark_read(id, user.id).await
    }

    pub async fn mark_unread(&self, user: &User, id: Uuid) -> Result<bool> {
        self.find_visible(user, id).await?;
        self.read_state.mark_unread(id, user.id).await
    }
}
