use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest},
    error::Result,
    service::Read,
};

#[derive(Debug, Deserialize)]
pub struct ListAnnouncementsQuery {
    pub limit: Option<usize>,
    pub unread_only: Option<bool>,
    pub important_only: Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListAnnouncementsQuery>,
) -> Result<Json<Vec<Read<Announcement>>>> {
    let limit = params.limit.unwrap_or(50).min(200);
    let unread_only = params.unread_only.unwrap_or(false);
    let important_only = params.important_only.unwrap_or(false);

    let announcements = state.service_context.announcement_service
        .list_for(&current.user)
        .await?
        .into_iter()
        .filter(|a| !unread_only || !a.read)
        .filter(|a| !important_only || a.item.important)
        .take(limit)
        .collect();

    Ok(Json(announcements))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Read<Announcement>>> {
    let announcement = state.service_context.announcement_service
        .get_for(&current.user, id)
        .await?;

    Ok(Json(announcement))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let announcement = state.service_context.announcement_service
        .create(&current.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Announcement>> {
    let announcement = state.service_context.announcement_service
        .update(&current.user, id, request)
        .await?;

    Ok(Json(announcement))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.announcement_service
        .delete(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.announcement_service
        .mark_read(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_unread(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.announcement_service
        .mark_unread(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct UnreadCount {
    pub count: usize,
}

/// Unread announcements among those the caller can see.
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UnreadCount>> {
    let count = state.service_context.announcement_service
        .unread_count(&current.user)
        .await?;

    Ok(Json(UnreadCount { count }))
}
