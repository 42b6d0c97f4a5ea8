use std::sync::Arc;

use crate::applications::ApplicationRepo;
use crate::auth::{SessionRepo, UserRepo};
use crate::config::AppConfig;
use crate::db::PgStore;
use crate::feed::JobFeed;
use crate::jobs::JobRepo;
use crate::profiles::ProfileRepo;
use crate::resumes::ResumeRepo;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub sessions: Arc<dyn SessionRepo>,
    pub profiles: Arc<dyn ProfileRepo>,
    pub resumes: Arc<dyn ResumeRepo>,
    pub jobs: Arc<dyn JobRepo>,
    pub applications: Arc<dyn ApplicationRepo>,
    pub feed: JobFeed,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = PgStore::connect(&config).await?;
        store.migrate().await?;
        tracing::info!("database ready");

        Ok(Self::from_store(config, Arc::new(store)))
    }

    /// Wires every repository to the same backing store.
    pub fn from_store<S>(config: Arc<AppConfig>, store: Arc<S>) -> Self
    where
        S: UserRepo
            + SessionRepo
            + ProfileRepo
            + ResumeRepo
            + JobRepo
            + ApplicationRepo
            + 'static,
    {
        let feed = JobFeed::new(config.job_feed_capacity);
        Self {
            users: store.clone(),
            sessions: store.clone(),
            profiles: store.clone(),
            resumes: store.clone(),
            jobs: store.clone(),
            applications: store,
            config,
            feed,
        }
    }
}
