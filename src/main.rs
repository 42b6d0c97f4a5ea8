mod app;
mod applications;
mod auth;
mod config;
mod dashboard;
mod db;
mod error;
mod feed;
mod jobs;
mod profiles;
mod resumes;
mod state;
#[cfg(test)]
mod testing;

use crate::app::{build_app, serve};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "jobboard=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;
    let server = state.config.server.clone();

    serve(build_app(state), &server).await
}
