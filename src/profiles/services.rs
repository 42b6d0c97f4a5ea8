use tracing::{info, warn};

use super::dto::UpdateProfileRequest;
use super::repo_types::{Profile, UserType};
use crate::auth::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Stored profile, or a freshly created default when the user has none yet.
pub async fn get_or_create(state: &AppState, session: &Session) -> Result<Profile, AppError> {
    if let Some(profile) = state.profiles.get(session.user_id).await? {
        return Ok(profile);
    }

    let email = state
        .users
        .find_by_id(session.user_id)
        .await?
        .map(|u| u.email)
        .unwrap_or_default();
    warn!(user_id = %session.user_id, "profile missing, creating default");
    let profile = Profile::new_default(session.user_id, &email, "", UserType::Jobseeker);
    Ok(state.profiles.insert(profile).await?)
}

pub async fn update(
    state: &AppState,
    session: &Session,
    req: UpdateProfileRequest,
) -> Result<Profile, AppError> {
    let mut profile = get_or_create(state, session).await?;

    if let Some(v) = req.full_name {
        profile.full_name = v.trim().to_string();
    }
    if let Some(v) = req.avatar_url {
        profile.avatar_url = v.trim().to_string();
    }
    if let Some(v) = req.bio {
        profile.bio = v;
    }
    if let Some(v) = req.location {
        profile.location = v.trim().to_string();
    }
    if let Some(v) = req.website {
        profile.website = v.trim().to_string();
    }
    if let Some(v) = req.user_type {
        profile.user_type = v;
    }

    let saved = state.profiles.upsert(profile).await?;
    info!(user_id = %saved.id, user_type = %saved.user_type, "profile saved");
    Ok(saved)
}
