use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use extractors::Session;
pub use repo::{SessionRepo, UserRepo};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
