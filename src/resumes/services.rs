use tracing::info;

use super::dto::ResumeView;
use super::repo_types::{Resume, ResumeContent};
use crate::auth::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Trim skills, drop blanks and keep only the first occurrence of each.
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !out.iter().any(|s| s == skill) {
            out.push(skill.to_string());
        }
    }
    out
}

pub async fn get(state: &AppState, session: &Session) -> Result<ResumeView, AppError> {
    if let Some(resume) = state.resumes.get_by_user(session.user_id).await? {
        return Ok(ResumeView {
            saved: true,
            resume: Some(resume),
            draft: None,
        });
    }

    // Nothing saved yet: prefill the contact fields from the profile, then the account.
    let profile = state.profiles.get(session.user_id).await?;
    let (name, mut email) = profile
        .map(|p| (p.full_name, p.email))
        .unwrap_or_default();
    if email.is_empty() {
        if let Some(user) = state.users.find_by_id(session.user_id).await? {
            email = user.email;
        }
    }

    Ok(ResumeView {
        saved: false,
        resume: None,
        draft: Some(ResumeContent {
            name,
            email,
            ..Default::default()
        }),
    })
}

pub async fn save(
    state: &AppState,
    session: &Session,
    mut content: ResumeContent,
) -> Result<Resume, AppError> {
    content.name = content.name.trim().to_string();
    content.email = content.email.trim().to_string();
    content.phone = content.phone.trim().to_string();
    content.skills = normalize_skills(content.skills);

    let resume = state.resumes.upsert(session.user_id, content).await?;
    info!(user_id = %session.user_id, resume_id = %resume.id, "resume saved");
    Ok(resume)
}
