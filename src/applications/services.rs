//! Application lifecycle: applying, employer status changes and interview scheduling.
//!
//! Every status change is checked against [`ApplicationStatus::allowed_transitions`]
//! before anything is written.

use time::macros::format_description;
use time::{Date, Time};
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{ApplyRequest, InterviewRequest, NextStep, ScheduledInterview, StatusUpdate};
use super::repo_types::{
    Application, ApplicationStatus, EmployerApplication, InterviewDetails, InterviewSlot,
    SeekerApplication,
};
use crate::auth::Session;
use crate::db::StoreError;
use crate::error::AppError;
use crate::profiles::UserType;
use crate::state::AppState;

const MY_APPLICATIONS_LIMIT: i64 = 100;

pub fn check_transition(from: ApplicationStatus, to: ApplicationStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition { from, to })
    }
}

/// Parses the submitted form. Dates in the past are accepted.
pub fn parse_interview(req: InterviewRequest) -> Result<InterviewSlot, AppError> {
    let interview_date = Date::parse(
        req.interview_date.trim(),
        format_description!("[year]-[month]-[day]"),
    )
    .map_err(|_| AppError::Validation("interview_date must be formatted YYYY-MM-DD".into()))?;
    let interview_time = Time::parse(
        req.interview_time.trim(),
        format_description!("[hour]:[minute]"),
    )
    .map_err(|_| AppError::Validation("interview_time must be formatted HH:MM".into()))?;

    Ok(InterviewSlot {
        interview_date,
        interview_time,
        location: req.location.trim().to_string(),
        dress_code: req.dress_code.trim().to_string(),
        items_to_bring: req.items_to_bring.trim().to_string(),
        additional_instructions: req.additional_instructions.trim().to_string(),
    })
}

pub async fn apply(
    state: &AppState,
    session: &Session,
    job_id: Uuid,
    req: ApplyRequest,
) -> Result<Application, AppError> {
    session.require(UserType::Jobseeker)?;

    if state.jobs.get(job_id).await?.is_none() {
        return Err(AppError::NotFound("Job not found".into()));
    }

    let Some(resume) = state.resumes.get_by_user(session.user_id).await? else {
        warn!(user_id = %session.user_id, %job_id, "apply without resume");
        return Err(AppError::ResumeRequired);
    };

    if state
        .applications
        .find_for(job_id, session.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyApplied);
    }

    let cover_letter = req.cover_letter.unwrap_or_default().trim().to_string();
    let application = state
        .applications
        .insert(job_id, session.user_id, resume.id, cover_letter)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent apply.
            StoreError::Conflict => AppError::AlreadyApplied,
            other => other.into(),
        })?;

    info!(
        application_id = %application.id,
        %job_id,
        user_id = %session.user_id,
        "application submitted"
    );
    Ok(application)
}

/// Loads an application whose job belongs to the calling employer.
async fn owned_application(
    state: &AppState,
    session: &Session,
    application_id: Uuid,
) -> Result<Application, AppError> {
    session.require(UserType::Employer)?;

    let application = state
        .applications
        .get(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".into()))?;

    let owner = state
        .jobs
        .get(application.job_id)
        .await?
        .and_then(|job| job.employer_id);
    if owner != Some(session.user_id) {
        warn!(
            user_id = %session.user_id,
            %application_id,
            "employer does not own this application's job"
        );
        return Err(AppError::Forbidden(
            "You can only manage applications to your own jobs".into(),
        ));
    }
    Ok(application)
}

fn not_in_interview(status: ApplicationStatus) -> AppError {
    AppError::InvalidState(format!(
        "Interview details can only be saved while the application is in interview (currently {status})"
    ))
}

/// The conditional write found a different status than the one checked: another
/// request changed the application in between.
async fn refused_after_race(state: &AppState, application_id: Uuid, to: ApplicationStatus) -> AppError {
    let current = match state.applications.get(application_id).await {
        Ok(Some(application)) => application.status,
        Ok(None) => return AppError::NotFound("Application not found".into()),
        Err(e) => return e.into(),
    };
    warn!(%application_id, %current, to = %to, "status changed concurrently");
    if current == to || current.can_transition_to(to) {
        AppError::InvalidState(format!(
            "Application moved to {current} while this change was being made"
        ))
    } else {
        AppError::InvalidTransition { from: current, to }
    }
}

pub async fn update_status(
    state: &AppState,
    session: &Session,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<StatusUpdate, AppError> {
    let current = owned_application(state, session, application_id).await?;
    if let Err(e) = check_transition(current.status, status) {
        warn!(
            %application_id,
            from = %current.status,
            to = %status,
            terminal = current.status.is_terminal(),
            "transition refused"
        );
        return Err(e);
    }

    let Some(application) = state
        .applications
        .update_status(application_id, current.status, status)
        .await?
    else {
        return Err(refused_after_race(state, application_id, status).await);
    };
    info!(%application_id, from = %current.status, to = %status, "application status changed");

    let next_step =
        (status == ApplicationStatus::Interview).then_some(NextStep::CaptureInterviewDetails);
    Ok(StatusUpdate {
        application,
        next_step,
    })
}

/// Second step after moving to `interview`. Refused in any other status.
pub async fn save_interview_details(
    state: &AppState,
    session: &Session,
    application_id: Uuid,
    req: InterviewRequest,
) -> Result<InterviewDetails, AppError> {
    let application = owned_application(state, session, application_id).await?;
    if application.status != ApplicationStatus::Interview {
        return Err(not_in_interview(application.status));
    }

    let slot = parse_interview(req)?;
    let Some(details) = state
        .applications
        .upsert_interview(application_id, slot)
        .await?
    else {
        let current = state
            .applications
            .get(application_id)
            .await?
            .map_or(application.status, |a| a.status);
        return Err(not_in_interview(current));
    };
    info!(%application_id, "interview details saved");
    Ok(details)
}

/// Moves to `interview` and stores the details in one transaction. Also used to
/// reschedule an application that is already in `interview`.
pub async fn schedule_interview(
    state: &AppState,
    session: &Session,
    application_id: Uuid,
    req: InterviewRequest,
) -> Result<ScheduledInterview, AppError> {
    let current = owned_application(state, session, application_id).await?;
    if current.status != ApplicationStatus::Interview {
        check_transition(current.status, ApplicationStatus::Interview)?;
    }

    let slot = parse_interview(req)?;
    let Some((application, interview)) = state
        .applications
        .schedule_interview(application_id, current.status, slot)
        .await?
    else {
        return Err(refused_after_race(state, application_id, ApplicationStatus::Interview).await);
    };
    info!(%application_id, from = %current.status, "interview scheduled");
    Ok(ScheduledInterview {
        application,
        interview,
    })
}

/// Readable by the applicant and by the employer owning the job.
pub async fn interview_for(
    state: &AppState,
    session: &Session,
    application_id: Uuid,
) -> Result<InterviewDetails, AppError> {
    let application = state
        .applications
        .get(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".into()))?;

    if application.user_id != session.user_id {
        owned_application(state, session, application_id).await?;
    }

    state
        .applications
        .get_interview(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No interview scheduled".into()))
}

pub async fn employer_applications(
    state: &AppState,
    session: &Session,
) -> Result<Vec<EmployerApplication>, AppError> {
    session.require(UserType::Employer)?;
    Ok(state.applications.list_for_employer(session.user_id).await?)
}

pub async fn my_applications(
    state: &AppState,
    session: &Session,
) -> Result<Vec<SeekerApplication>, AppError> {
    Ok(state
        .applications
        .list_for_applicant(session.user_id, MY_APPLICATIONS_LIMIT)
        .await?)
}
