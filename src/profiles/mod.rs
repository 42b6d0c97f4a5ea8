pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::ProfileRepo;
pub use repo_types::{Profile, UserType};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
