use serde::Serialize;

use super::repo_types::{Resume, ResumeContent};

/// Resume as shown to its owner; `saved = false` marks an unsaved draft.
#[derive(Debug, Serialize)]
pub struct ResumeView {
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<Resume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<ResumeContent>,
}
