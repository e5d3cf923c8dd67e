//! Profile entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileEntity> for domain::models::Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            name: entity.name,
            avatar_url: entity.avatar_url,
            created_at: entity.created_at,
        }
    }
}
