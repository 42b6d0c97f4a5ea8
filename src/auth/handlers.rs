use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, LogoutRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::Session,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let resp = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(services::login(&state, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(services::refresh(&state, &payload.refresh_token).await?))
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    payload: Option<Json<LogoutRequest>>,
) -> Result<StatusCode, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    services::logout(&state, &session, payload.refresh_token.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(services::me(&state, &session).await?))
}
