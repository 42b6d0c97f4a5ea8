use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Profile, ProfileRow};
use crate::db::{PgStore, StoreResult};

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Profile>>;
    /// Insert-if-absent; returns the stored row either way.
    async fn insert(&self, profile: Profile) -> StoreResult<Profile>;
    async fn upsert(&self, profile: Profile) -> StoreResult<Profile>;
}

pub(crate) const PROFILE_COLUMNS: &str =
    "id, email, full_name, avatar_url, bio, location, website, user_type, created_at, updated_at";

#[async_trait]
impl ProfileRepo for PgStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Profile::try_from).transpose()
    }

    async fn insert(&self, profile: Profile) -> StoreResult<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, avatar_url, bio, location, website, user_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(profile.user_type.as_str())
        .execute(&self.db)
        .await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(profile.id)
        .fetch_one(&self.db)
        .await?;
        Profile::try_from(row)
    }

    async fn upsert(&self, profile: Profile) -> StoreResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO profiles (id, email, full_name, avatar_url, bio, location, website, user_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                avatar_url = EXCLUDED.avatar_url,
                bio = EXCLUDED.bio,
                location = EXCLUDED.location,
                website = EXCLUDED.website,
                user_type = EXCLUDED.user_type,
                updated_at = now()
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
        .fetch_one(&self.db)
        .await?;
        Profile::try_from(row)
    }
}
