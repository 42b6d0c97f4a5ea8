use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A posted listing. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub requirements: String,
    pub employer_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Job {
    /// `requirements` split on commas, trimmed, blanks dropped.
    pub fn requirement_list(&self) -> Vec<String> {
        self.requirements
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Validated input for a new listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub requirements: String,
}

/// Substring filters; `None` or blank means "match everything".
#[derive(Debug, Clone, Default)]
pub struct JobSearch {
    pub query: Option<String>,
    pub location: Option<String>,
}

impl JobSearch {
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}
