use async_trait::async_trait;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::repo_types::{
    Application, ApplicationRow, ApplicationStats, ApplicationStatus, EmployerApplication,
    EmployerApplicationRow, InterviewDetails, InterviewSlot, SeekerApplication,
    SeekerApplicationRow,
};
use crate::db::{PgStore, StoreError, StoreResult};

#[async_trait]
pub trait ApplicationRepo: Send + Sync {
    /// New `pending` application. `Conflict` if (job, user) already has one.
    async fn insert(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        resume_id: Uuid,
        cover_letter: String,
    ) -> StoreResult<Application>;
    async fn find_for(&self, job_id: Uuid, user_id: Uuid) -> StoreResult<Option<Application>>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Application>>;
    /// Applications to jobs owned by `employer_id`, newest first.
    async fn list_for_employer(&self, employer_id: Uuid) -> StoreResult<Vec<EmployerApplication>>;
    /// The applicant's own applications, newest first.
    async fn list_for_applicant(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<SeekerApplication>>;
    /// Writes `to` only while the stored status is still `from`; `None` otherwise.
    /// `NotFound` if the application does not exist.
    async fn update_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> StoreResult<Option<Application>>;
    /// `None` unless the application is currently in `interview`.
    async fn upsert_interview(
        &self,
        application_id: Uuid,
        slot: InterviewSlot,
    ) -> StoreResult<Option<InterviewDetails>>;
    async fn get_interview(&self, application_id: Uuid) -> StoreResult<Option<InterviewDetails>>;
    /// Moves the application from `from` to `interview` and stores the slot in one
    /// transaction. `None`, with nothing written, if the status is no longer `from`.
    async fn schedule_interview(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        slot: InterviewSlot,
    ) -> StoreResult<Option<(Application, InterviewDetails)>>;
    async fn stats_for_employer(&self, employer_id: Uuid) -> StoreResult<ApplicationStats>;
    async fn stats_for_applicant(&self, user_id: Uuid) -> StoreResult<ApplicationStats>;
}

const APPLICATION_COLUMNS: &str =
    "id, job_id, user_id, resume_id, status, cover_letter, created_at, updated_at";

const INTERVIEW_COLUMNS: &str = "application_id, interview_date, interview_time, location, \
     dress_code, items_to_bring, additional_instructions, created_at, updated_at";

async fn set_status<'e, E: PgExecutor<'e>>(
    exec: E,
    id: Uuid,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> StoreResult<Option<Application>> {
    let row = sqlx::query_as::<_, ApplicationRow>(&format!(
        r#"
        UPDATE applications
        SET status = $3, updated_at = now()
        WHERE id = $1 AND status = $2
        RETURNING {APPLICATION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .fetch_optional(exec)
    .await?;
    row.map(Application::try_from).transpose()
}

async fn status_of<'e, E: PgExecutor<'e>>(
    exec: E,
    id: Uuid,
    lock: bool,
) -> StoreResult<ApplicationStatus> {
    let sql = if lock {
        "SELECT status FROM applications WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT status FROM applications WHERE id = $1"
    };
    let (status,): (String,) = sqlx::query_as(sql)
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or(StoreError::NotFound)?;
    status.parse().map_err(StoreError::Unavailable)
}

async fn upsert_slot<'e, E: PgExecutor<'e>>(
    exec: E,
    application_id: Uuid,
    slot: &InterviewSlot,
) -> StoreResult<Option<InterviewDetails>> {
    let details = sqlx::query_as::<_, InterviewDetails>(&format!(
        r#"
        INSERT INTO interview_details (application_id, interview_date, interview_time, location,
                                       dress_code, items_to_bring, additional_instructions)
        SELECT a.id, $2::date, $3::time, $4, $5, $6, $7
        FROM applications a
        WHERE a.id = $1 AND a.status = 'interview'
        ON CONFLICT (application_id) DO UPDATE SET
            interview_date = EXCLUDED.interview_date,
            interview_time = EXCLUDED.interview_time,
            location = EXCLUDED.location,
            dress_code = EXCLUDED.dress_code,
            items_to_bring = EXCLUDED.items_to_bring,
            additional_instructions = EXCLUDED.additional_instructions,
            updated_at = now()
        RETURNING {INTERVIEW_COLUMNS}
        "#
    ))
    .bind(application_id)
    .bind(slot.interview_date)
    .bind(slot.interview_time)
    .bind(&slot.location)
    .bind(&slot.dress_code)
    .bind(&slot.items_to_bring)
    .bind(&slot.additional_instructions)
    .fetch_optional(exec)
    .await?;
    Ok(details)
}

#[async_trait]
impl ApplicationRepo for PgStore {
    async fn insert(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        resume_id: Uuid,
        cover_letter: String,
    ) -> StoreResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications (job_id, user_id, resume_id, status, cover_letter)
            VALUES ($1, $2, $3, 'pending', $4)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(user_id)
        .bind(resume_id)
        .bind(&cover_letter)
        .fetch_one(&self.db)
        .await?;
        Application::try_from(row)
    }

    async fn find_for(&self, job_id: Uuid, user_id: Uuid) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = $1 AND user_id = $2"
        ))
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn list_for_employer(&self, employer_id: Uuid) -> StoreResult<Vec<EmployerApplication>> {
        let rows = sqlx::query_as::<_, EmployerApplicationRow>(
            r#"
            SELECT a.id, a.job_id, a.user_id, a.resume_id, a.status, a.cover_letter,
                   a.created_at, a.updated_at,
                   j.title AS job_title,
                   j.company AS job_company,
                   COALESCE(NULLIF(p.full_name, ''), r.name, '') AS applicant_name,
                   COALESCE(NULLIF(p.email, ''), u.email) AS applicant_email,
                   COALESCE(r.phone, '') AS resume_phone,
                   COALESCE(r.skills, '{}') AS resume_skills
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN users u ON u.id = a.user_id
            LEFT JOIN profiles p ON p.id = a.user_id
            LEFT JOIN resumes r ON r.id = a.resume_id
            WHERE j.employer_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(EmployerApplication::try_from).collect()
    }

    async fn list_for_applicant(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<SeekerApplication>> {
        let rows = sqlx::query_as::<_, SeekerApplicationRow>(
            r#"
            SELECT a.id, a.job_id, a.user_id, a.resume_id, a.status, a.cover_letter,
                   a.created_at, a.updated_at,
                   j.title AS job_title,
                   j.company AS job_company,
                   j.location AS job_location
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.user_id = $1
            ORDER BY a.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(SeekerApplication::try_from).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        match set_status(&self.db, id, from, to).await? {
            Some(application) => Ok(Some(application)),
            // Zero rows: either the id is unknown or the status moved on.
            None => status_of(&self.db, id, false).await.map(|_| None),
        }
    }

    async fn upsert_interview(
        &self,
        application_id: Uuid,
        slot: InterviewSlot,
    ) -> StoreResult<Option<InterviewDetails>> {
        upsert_slot(&self.db, application_id, &slot).await
    }

    async fn get_interview(&self, application_id: Uuid) -> StoreResult<Option<InterviewDetails>> {
        let row = sqlx::query_as::<_, InterviewDetails>(&format!(
            "SELECT {INTERVIEW_COLUMNS} FROM interview_details WHERE application_id = $1"
        ))
        .bind(application_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn schedule_interview(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        slot: InterviewSlot,
    ) -> StoreResult<Option<(Application, InterviewDetails)>> {
        let mut tx = self.db.begin().await?;

        // Row lock held until commit; the checked status cannot change underneath us.
        if status_of(&mut *tx, id, true).await? != from {
            tx.rollback().await?;
            return Ok(None);
        }
        let application = set_status(&mut *tx, id, from, ApplicationStatus::Interview)
            .await?
            .ok_or(StoreError::NotFound)?;
        let details = upsert_slot(&mut *tx, id, &slot)
            .await?
            .ok_or(StoreError::NotFound)?;

        tx.commit().await?;
        Ok(Some((application, details)))
    }

    async fn stats_for_employer(&self, employer_id: Uuid) -> StoreResult<ApplicationStats> {
        let stats = sqlx::query_as::<_, ApplicationStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE a.status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE a.status = 'interview') AS interview
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE j.employer_id = $1
            "#,
        )
        .bind(employer_id)
        .fetch_one(&self.db)
        .await?;
        Ok(stats)
    }

    async fn stats_for_applicant(&self, user_id: Uuid) -> StoreResult<ApplicationStats> {
        let stats = sqlx::query_as::<_, ApplicationStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'interview') AS interview
            FROM applications
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(stats)
    }
}
