use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub description: String,
}

/// CV content as written by its owner; one per user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeContent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub content: ResumeContent,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub education: Json<Vec<Education>>,
    pub experience: Json<Vec<Experience>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<ResumeRow> for Resume {
    fn from(r: ResumeRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            content: ResumeContent {
                name: r.name,
                email: r.email,
                phone: r.phone,
                skills: r.skills,
                education: r.education.0,
                experience: r.experience.0,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
