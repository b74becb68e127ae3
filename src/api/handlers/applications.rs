use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Application, ReviewApplicationRequest, SubmitApplicationRequest},
    error::Result,
};

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Application>>> {
    let applications = state.service_context.application_service
        .list_for(&current.user)
        .await;

    Ok(Json(applications))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>> {
    let application = state.service_context.application_service
        .get_for(&current.user, id)
        .await?;

    Ok(Json(application))
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<SubmitApplicationRequest>,
) -> Result<(StatusCode, Json<Application>)> {
    let application = state.service_context.application_service
        .submit(&current.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewApplicationRequest>,
) -> Result<Json<Application>> {
    let application = state.service_context.application_service
        .review(&current.user, id, request)
        .await?;

    Ok(Json(application))
}

pub async fn withdraw(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.application_service
        .withdraw(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
