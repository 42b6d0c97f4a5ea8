use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{JobView, Pagination, PostJobRequest, SearchParams};
use super::repo_types::JobSearch;
use super::services;
use crate::{auth::Session, error::AppError, state::AppState};

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(post_job))
        .route("/jobs/search", get(search_jobs))
        .route("/jobs/:id", get(get_job))
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<JobView>>, AppError> {
    let (limit, offset) = p.clamped();
    let jobs = services::list(&state, limit, offset).await?;
    Ok(Json(jobs.into_iter().map(JobView::from).collect()))
}

#[instrument(skip(state))]
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<JobView>>, AppError> {
    let search = JobSearch {
        query: params.q,
        location: params.location,
    };
    let jobs = services::search(&state, search, params.limit).await?;
    Ok(Json(jobs.into_iter().map(JobView::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobView>, AppError> {
    Ok(Json(services::get(&state, id).await?.into()))
}

/// POST /jobs (employer only); 201 with a Location header.
#[instrument(skip(state, session, req), fields(user_id = %session.user_id))]
pub async fn post_job(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<PostJobRequest>,
) -> Result<(StatusCode, HeaderMap, Json<JobView>), AppError> {
    let job = services::post(&state, &session, req).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/jobs/{}", job.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(job.into())))
}
