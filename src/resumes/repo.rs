use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::repo_types::{Resume, ResumeContent, ResumeRow};
use crate::db::{PgStore, StoreResult};

#[async_trait]
pub trait ResumeRepo: Send + Sync {
    async fn get_by_user(&self, user_id: Uuid) -> StoreResult<Option<Resume>>;
    /// Insert or replace the user's resume, keyed by `user_id`.
    async fn upsert(&self, user_id: Uuid, content: ResumeContent) -> StoreResult<Resume>;
}

#[async_trait]
impl ResumeRepo for PgStore {
    async fn get_by_user(&self, user_id: Uuid) -> StoreResult<Option<Resume>> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, name, email, phone, skills, education, experience,
                   created_at, updated_at
            FROM resumes
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Resume::from))
    }

    async fn upsert(&self, user_id: Uuid, content: ResumeContent) -> StoreResult<Resume> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (user_id, name, email, phone, skills, education, experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                skills = EXCLUDED.skills,
                education = EXCLUDED.education,
                experience = EXCLUDED.experience,
                updated_at = now()
            RETURNING id, user_id, name, email, phone, skills, education, experience,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&content.name)
        .bind(&content.email)
        .bind(&content.phone)
        .bind(&content.skills)
        .bind(Json(&content.education))
        .bind(Json(&content.experience))
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }
}
