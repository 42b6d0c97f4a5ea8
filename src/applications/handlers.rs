use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{ApplyRequest, InterviewRequest, ScheduledInterview, StatusUpdate, UpdateStatusRequest};
use super::repo_types::{Application, EmployerApplication, InterviewDetails, SeekerApplication};
use super::services;
use crate::{auth::Session, error::AppError, state::AppState};

pub fn seeker_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs/:id/apply", post(apply))
        .route("/me/applications", get(my_applications))
        .route("/applications/:id/interview", get(get_interview))
}

pub fn employer_routes() -> Router<AppState> {
    Router::new()
        .route("/employer/applications", get(employer_applications))
        .route("/employer/applications/:id/status", patch(update_status))
        .route(
            "/employer/applications/:id/interview",
            post(schedule_interview).put(save_interview_details),
        )
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn apply(
    State(state): State<AppState>,
    session: Session,
    Path(job_id): Path<Uuid>,
    payload: Option<Json<ApplyRequest>>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let req = payload.map(|Json(p)| p).unwrap_or_default();
    let application = services::apply(&state, &session, job_id, req).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn my_applications(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<SeekerApplication>>, AppError> {
    Ok(Json(services::my_applications(&state, &session).await?))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn get_interview(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewDetails>, AppError> {
    Ok(Json(services::interview_for(&state, &session, id).await?))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn employer_applications(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<EmployerApplication>>, AppError> {
    Ok(Json(services::employer_applications(&state, &session).await?))
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdate>, AppError> {
    Ok(Json(
        services::update_status(&state, &session, id, payload.status).await?,
    ))
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn save_interview_details(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<InterviewRequest>,
) -> Result<Json<InterviewDetails>, AppError> {
    Ok(Json(
        services::save_interview_details(&state, &session, id, payload).await?,
    ))
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn schedule_interview(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<InterviewRequest>,
) -> Result<Json<ScheduledInterview>, AppError> {
    Ok(Json(
        services::schedule_interview(&state, &session, id, payload).await?,
    ))
}
