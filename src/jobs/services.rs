use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{PostJobRequest, MAX_PAGE_SIZE};
use super::repo_types::{Job, JobSearch, NewJob};
use crate::auth::Session;
use crate::error::AppError;
use crate::feed::JobChange;
use crate::profiles::UserType;
use crate::state::AppState;

/// Trims every field and requires the ones a listing cannot do without.
pub fn validate_new_job(req: PostJobRequest) -> Result<NewJob, AppError> {
    let job = NewJob {
        title: req.title.trim().to_string(),
        company: req.company.trim().to_string(),
        location: req.location.trim().to_string(),
        salary: req.salary.trim().to_string(),
        description: req.description.trim().to_string(),
        requirements: req.requirements.trim().to_string(),
    };

    let missing: Vec<&str> = [
        ("title", &job.title),
        ("company", &job.company),
        ("location", &job.location),
        ("description", &job.description),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    Ok(job)
}

pub async fn list(state: &AppState, limit: i64, offset: i64) -> Result<Vec<Job>, AppError> {
    Ok(state.jobs.list(limit, offset).await?)
}

pub async fn get(state: &AppState, id: Uuid) -> Result<Job, AppError> {
    state
        .jobs
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".into()))
}

pub async fn search(state: &AppState, search: JobSearch, limit: i64) -> Result<Vec<Job>, AppError> {
    Ok(state
        .jobs
        .search(&search, limit.clamp(1, MAX_PAGE_SIZE))
        .await?)
}

/// Employer-only. Persists the listing and announces it on the job feed.
pub async fn post(
    state: &AppState,
    session: &Session,
    req: PostJobRequest,
) -> Result<Job, AppError> {
    if let Err(e) = session.require(UserType::Employer) {
        warn!(user_id = %session.user_id, "non-employer tried to post a job");
        return Err(e);
    }
    let new_job = validate_new_job(req)?;
    let job = state.jobs.insert(session.user_id, new_job).await?;

    state.feed.publish(JobChange::Insert {
        job: job.clone(),
        at: job.created_at,
    });
    info!(job_id = %job.id, employer_id = %session.user_id, "job posted");
    Ok(job)
}
