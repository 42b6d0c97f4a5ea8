use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::services::{self, EmployerDashboard, SeekerDashboard};
use crate::{auth::Session, error::AppError, state::AppState};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/me/dashboard", get(seeker_dashboard))
        .route("/employer/dashboard", get(employer_dashboard))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn seeker_dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SeekerDashboard>, AppError> {
    Ok(Json(services::seeker(&state, &session).await?))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn employer_dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<EmployerDashboard>, AppError> {
    Ok(Json(services::employer(&state, &session).await?))
}
