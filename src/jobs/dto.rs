use serde::{Deserialize, Serialize};

use super::repo_types::Job;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_PAGE_SIZE), self.offset.max(0))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub location: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct PostJobRequest {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub salary: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
}

/// A job plus its requirements split into a list.
#[derive(Debug, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub requirement_list: Vec<String>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        let requirement_list = job.requirement_list();
        Self { job, requirement_list }
    }
}
