use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::ResumeView;
use super::repo_types::{Resume, ResumeContent};
use super::services;
use crate::{auth::Session, error::AppError, state::AppState};

pub fn resume_routes() -> Router<AppState> {
    Router::new().route("/resume", get(get_resume).put(put_resume))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn get_resume(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ResumeView>, AppError> {
    Ok(Json(services::get(&state, &session).await?))
}

#[instrument(skip(state, session, content), fields(user_id = %session.user_id))]
pub async fn put_resume(
    State(state): State<AppState>,
    session: Session,
    Json(content): Json<ResumeContent>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(services::save(&state, &session, content).await?))
}
