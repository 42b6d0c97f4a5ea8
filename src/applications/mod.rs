use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::ApplicationRepo;
pub use repo_types::{ApplicationStats, ApplicationStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::seeker_routes())
        .merge(handlers::employer_routes())
}
