//! Profile repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProfileEntity;
use crate::metrics::QueryTimer;

/// Repository for host profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the profile from verified identity claims.
    /// A missing name never overwrites a stored one.
    pub async fn upsert(
        &self,
        id: Uuid,
        email: &str,
        name: Option<&str>,
    ) -> Result<ProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_profile");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            INSERT INTO profiles (id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                name = COALESCE(EXCLUDED.name, profiles.name),
                updated_at = NOW()
            RETURNING id, email, name, avatar_url, created_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a profile by its (already normalized) email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_email");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT id, email, name, avatar_url, created_at
            FROM profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
