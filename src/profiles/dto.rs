use serde::Deserialize;

use super::repo_types::UserType;

/// Editable profile fields; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub user_type: Option<UserType>,
}
