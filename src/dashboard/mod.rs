//! Landing-page summaries for job seekers and employers.

pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::dashboard_routes()
}
