use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::db::{PgStore, StoreResult};
use crate::profiles::repo::PROFILE_COLUMNS;
use crate::profiles::repo_types::ProfileRow;
use crate::profiles::{Profile, UserType};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Creates the account and its profile together; neither row exists if either insert
    /// fails. Fails with `StoreError::Conflict` when the email is taken.
    async fn create_with_profile(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        user_type: UserType,
    ) -> StoreResult<(User, Profile)>;
}

/// Revoked session ids; a token whose `jti` is listed here is rejected.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn revoke(&self, jti: Uuid, user_id: Uuid, expires_at: OffsetDateTime) -> StoreResult<()>;
    async fn is_revoked(&self, jti: Uuid) -> StoreResult<bool>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_with_profile(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        user_type: UserType,
    ) -> StoreResult<(User, Profile)> {
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let profile = Profile::new_default(user.id, &user.email, full_name, user_type);
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO profiles (id, email, full_name, avatar_url, bio, location, website, user_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(profile.user_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // Dropping `tx` on an early return above rolls both inserts back.
        tx.commit().await?;
        Ok((user, Profile::try_from(row)?))
    }
}

#[async_trait]
impl SessionRepo for PgStore {
    async fn revoke(&self, jti: Uuid, user_id: Uuid, expires_at: OffsetDateTime) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_sessions (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> StoreResult<bool> {
        let row: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT jti FROM revoked_sessions WHERE jti = $1"#)
                .bind(jti)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.is_some())
    }
}
