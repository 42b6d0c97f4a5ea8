use serde::{Deserialize, Serialize};

use super::repo_types::{Application, ApplicationStatus, InterviewDetails};

#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

/// Interview form as submitted: `interview_date` is `YYYY-MM-DD`, `interview_time` is `HH:MM`.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewRequest {
    pub interview_date: String,
    pub interview_time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub dress_code: String,
    #[serde(default)]
    pub items_to_bring: String,
    #[serde(default)]
    pub additional_instructions: String,
}

/// What the caller should do after a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    CaptureInterviewDetails,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<NextStep>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledInterview {
    pub application: Application,
    pub interview: InterviewDetails,
}
