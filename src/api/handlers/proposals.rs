use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        CreateProposalRequest, Proposal, ProposalStatus, ReviewProposalRequest,
        UpdateProposalRequest,
    },
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListProposalsQuery {
    pub status: Option<ProposalStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListProposalsQuery>,
) -> Result<Json<Vec<Proposal>>> {
    let proposals = state.service_context.proposal_service
        .list_for(&current.user)
        .await
        .into_iter()
        .filter(|p| params.status.map_or(true, |status| p.status == status))
        .collect();

    Ok(Json(proposals))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Proposal>> {
    let proposal = state.service_context.proposal_service
        .get_for(&current.user, id)
        .await?;

    Ok(Json(proposal))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateProposalRequest>,
) -> Result<(StatusCode, Json<Proposal>)> {
    let proposal = state.service_context.proposal_service
        .create(&current.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(proposal)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProposalRequest>,
) -> Result<Json<Proposal>> {
    let proposal = state.service_context.proposal_service
        .update(&current.user, id, request)
        .await?;

    Ok(Json(proposal))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.proposal_service
        .delete(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Proposal>> {
    let proposal = state.service_context.proposal_service
        .start_review(&current.user, id)
        .await?;

    Ok(Json(proposal))
}

pub async fn review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewProposalRequest>,
) -> Result<Json<Proposal>> {
    let proposal = state.service_context.proposal_service
        .review(&current.user, id, request)
        .await?;

    Ok(Json(proposal))
}
