use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Job, JobSearch, NewJob};
use crate::db::{contains_pattern, PgStore, StoreResult};

#[async_trait]
pub trait JobRepo: Send + Sync {
    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Job>>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Job>>;
    /// Newest first.
    async fn search(&self, search: &JobSearch, limit: i64) -> StoreResult<Vec<Job>>;
    async fn insert(&self, employer_id: Uuid, job: NewJob) -> StoreResult<Job>;
    async fn list_by_employer(&self, employer_id: Uuid, limit: i64) -> StoreResult<Vec<Job>>;
    async fn count_by_employer(&self, employer_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
impl JobRepo for PgStore {
    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, salary, description, requirements,
                   employer_id, created_at
            FROM jobs
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Job>> {
        let row = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, salary, description, requirements,
                   employer_id, created_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn search(&self, search: &JobSearch, limit: i64) -> StoreResult<Vec<Job>> {
        let query = search.query().map(contains_pattern);
        let location = search.location().map(contains_pattern);
        let rows = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, salary, description, requirements,
                   employer_id, created_at
            FROM jobs
            WHERE ($1::text IS NULL
                   OR title ILIKE $1 OR company ILIKE $1 OR description ILIKE $1)
              AND ($2::text IS NULL OR location ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(query)
        .bind(location)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, employer_id: Uuid, job: NewJob) -> StoreResult<Job> {
        let row = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (title, company, location, salary, description, requirements, employer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, company, location, salary, description, requirements,
                      employer_id, created_at
            "#,
        )
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(employer_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_by_employer(&self, employer_id: Uuid, limit: i64) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, salary, description, requirements,
                   employer_id, created_at
            FROM jobs
            WHERE employer_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(employer_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn count_by_employer(&self, employer_id: Uuid) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM jobs WHERE employer_id = $1"#)
            .bind(employer_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}
