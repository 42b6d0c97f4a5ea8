use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::db::StoreError;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(hour_minute, Time, "[hour]:[minute]");

/// Where an application sits in the hiring workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Interview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Statuses an employer may move an application to from `self`.
    pub const fn allowed_transitions(self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Pending | Reviewed => &[Interview, Rejected],
            Interview => &[Accepted, Rejected],
            Accepted | Rejected => &[],
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status {s:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub status: String,
    pub cover_letter: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(StoreError::Unavailable)?;
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            user_id: row.user_id,
            resume_id: row.resume_id,
            status,
            cover_letter: row.cover_letter,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// An application as an employer sees it, joined with the job, the applicant's
/// profile and the resume summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployerApplication {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub job_company: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub resume_phone: String,
    pub resume_skills: Vec<String>,
}

#[derive(Debug, FromRow)]
pub struct EmployerApplicationRow {
    #[sqlx(flatten)]
    pub application: ApplicationRow,
    pub job_title: String,
    pub job_company: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub resume_phone: String,
    pub resume_skills: Vec<String>,
}

impl TryFrom<EmployerApplicationRow> for EmployerApplication {
    type Error = StoreError;

    fn try_from(row: EmployerApplicationRow) -> Result<Self, Self::Error> {
        Ok(EmployerApplication {
            application: row.application.try_into()?,
            job_title: row.job_title,
            job_company: row.job_company,
            applicant_name: row.applicant_name,
            applicant_email: row.applicant_email,
            resume_phone: row.resume_phone,
            resume_skills: row.resume_skills,
        })
    }
}

/// An application as the applicant sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeekerApplication {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub job_company: String,
    pub job_location: String,
}

#[derive(Debug, FromRow)]
pub struct SeekerApplicationRow {
    #[sqlx(flatten)]
    pub application: ApplicationRow,
    pub job_title: String,
    pub job_company: String,
    pub job_location: String,
}

impl TryFrom<SeekerApplicationRow> for SeekerApplication {
    type Error = StoreError;

    fn try_from(row: SeekerApplicationRow) -> Result<Self, Self::Error> {
        Ok(SeekerApplication {
            application: row.application.try_into()?,
            job_title: row.job_title,
            job_company: row.job_company,
            job_location: row.job_location,
        })
    }
}

/// Interview logistics to store against an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSlot {
    pub interview_date: Date,
    pub interview_time: Time,
    pub location: String,
    pub dress_code: String,
    pub items_to_bring: String,
    pub additional_instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InterviewDetails {
    pub application_id: Uuid,
    #[serde(with = "iso_date")]
    pub interview_date: Date,
    #[serde(with = "hour_minute")]
    pub interview_time: Time,
    pub location: String,
    pub dress_code: String,
    pub items_to_bring: String,
    pub additional_instructions: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Counts backing the dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct ApplicationStats {
    pub total: i64,
    pub pending: i64,
    pub interview: i64,
}
