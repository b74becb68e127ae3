use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateEventRequest, Event, UpdateEventRequest},
    error::Result,
    service::event_service::Attendees,
};

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub upcoming: Option<bool>,
    pub club_id: Option<Uuid>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>> {
    let now = Utc::now();
    let upcoming = params.upcoming.unwrap_or(false);

    let events = state.service_context.event_service
        .list_for(&current.user)
        .await
        .into_iter()
        .filter(|e| !upcoming || e.starts_at >= now)
        .filter(|e| params.club_id.map_or(true, |club| e.club_id == Some(club)))
        .collect();

    Ok(Json(events))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service
        .get_for(&current.user, id)
        .await?;

    Ok(Json(event))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.service_context.event_service
        .create(&current.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service
        .update(&current.user, id, request)
        .await?;

    Ok(Json(event))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.event_service
        .delete(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn rsvp(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service
        .rsvp(&current.user, id)
        .await?;

    Ok(Json(event))
}

pub async fn cancel_rsvp(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.service_context.event_service
        .cancel_rsvp(&current.user, id)
        .await?;

    Ok(Json(event))
}

pub async fn attendees(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Attendees>> {
    let attendees = state.service_context.event_service
        .attendees(&current.user, id)
        .await?;

    Ok(Json(attendees))
}
