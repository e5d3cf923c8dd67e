//! Guest entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the guests table.
#[derive(Debug, Clone, FromRow)]
pub struct GuestEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub magic_token: String,
    pub has_responded: bool,
    pub has_submitted_feedback: bool,
    pub created_at: DateTime<Utc>,
}

impl From<GuestEntity> for domain::models::Guest {
    fn from(entity: GuestEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            email: entity.email,
            name: entity.name,
            magic_token: entity.magic_token,
            has_responded: entity.has_responded,
            has_submitted_feedback: entity.has_submitted_feedback,
            created_at: entity.created_at,
        }
    }
}
