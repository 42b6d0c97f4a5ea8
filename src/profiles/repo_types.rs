use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::StoreError;

/// Account discriminator gating which endpoints a user may call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Jobseeker,
    Employer,
}

impl UserType {
    pub const fn as_str(self) -> &'static str {
        match self {
            UserType::Jobseeker => "jobseeker",
            UserType::Employer => "employer",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jobseeker" => Ok(UserType::Jobseeker),
            "employer" => Ok(UserType::Employer),
            other => Err(format!("unknown user type {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub user_type: UserType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Profile {
    pub fn new_default(id: Uuid, email: &str, full_name: &str, user_type: UserType) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            email: email.to_string(),
            full_name: full_name.to_string(),
            avatar_url: String::new(),
            bio: String::new(),
            location: String::new(),
            website: String::new(),
            user_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row as stored; `user_type` is TEXT guarded by a CHECK constraint.
#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub user_type: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StoreError;

    fn try_from(r: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            full_name: r.full_name,
            avatar_url: r.avatar_url,
            bio: r.bio,
            location: r.location,
            website: r.website,
            user_type: r.user_type.parse().map_err(StoreError::Unavailable)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
