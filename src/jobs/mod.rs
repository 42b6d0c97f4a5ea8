pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::JobRepo;
pub use repo_types::Job;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::job_routes()
}
