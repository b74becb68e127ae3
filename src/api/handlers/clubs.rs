use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::Club,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListClubsQuery {
    pub category: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListClubsQuery>,
) -> Result<Json<Vec<Club>>> {
    let clubs = &state.service_context.club_service;
    let clubs = match params.category {
        Some(category) => clubs.list_by_category(&category).await,
        None => clubs.list().await,
    };

    Ok(Json(clubs))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Club>> {
    let club = state.service_context.club_service.get(id).await?;
    Ok(Json(club))
}
