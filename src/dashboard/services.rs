use serde::Serialize;

use crate::applications::repo_types::SeekerApplication;
use crate::applications::ApplicationStats;
use crate::auth::Session;
use crate::error::AppError;
use crate::jobs::Job;
use crate::profiles::UserType;
use crate::state::AppState;

const RECENT_ACTIVITY: i64 = 5;
const RECOMMENDED_JOBS: i64 = 3;
const RECENT_JOBS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct SeekerDashboard {
    pub applications: i64,
    pub interviews: i64,
    pub recent_activity: Vec<SeekerApplication>,
    pub recommended_jobs: Vec<Job>,
}

#[derive(Debug, Serialize)]
pub struct EmployerDashboard {
    pub active_jobs: i64,
    pub total_applications: i64,
    pub pending_applications: i64,
    pub interviews: i64,
    pub recent_jobs: Vec<Job>,
}

pub async fn seeker(state: &AppState, session: &Session) -> Result<SeekerDashboard, AppError> {
    let ApplicationStats {
        total, interview, ..
    } = state.applications.stats_for_applicant(session.user_id).await?;
    let recent_activity = state
        .applications
        .list_for_applicant(session.user_id, RECENT_ACTIVITY)
        .await?;
    let recommended_jobs = state.jobs.list(RECOMMENDED_JOBS, 0).await?;

    Ok(SeekerDashboard {
        applications: total,
        interviews: interview,
        recent_activity,
        recommended_jobs,
    })
}

pub async fn employer(state: &AppState, session: &Session) -> Result<EmployerDashboard, AppError> {
    session.require(UserType::Employer)?;

    let active_jobs = state.jobs.count_by_employer(session.user_id).await?;
    let stats = state.applications.stats_for_employer(session.user_id).await?;
    let recent_jobs = state
        .jobs
        .list_by_employer(session.user_id, RECENT_JOBS)
        .await?;

    Ok(EmployerDashboard {
        active_jobs,
        total_applications: stats.total,
        pending_applications: stats.pending,
        interviews: stats.interview,
        recent_jobs,
    })
}
