use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::UpdateProfileRequest;
use super::repo_types::Profile;
use super::services;
use crate::{auth::Session, error::AppError, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn get_profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(services::get_or_create(&state, &session).await?))
}

#[instrument(skip(state, session, req), fields(user_id = %session.user_id))]
pub async fn put_profile(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(services::update(&state, &session, req).await?))
}
