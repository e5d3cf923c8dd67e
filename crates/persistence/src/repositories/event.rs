//! Event repository for database operations.

use domain::models::event::CreateEventRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{EventEntity, EventStatusDb, MainSelectionTypeDb};
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str = "e.id, e.group_id, e.title, e.description, e.event_date, e.status, \
     e.appetizer_ids, e.main_dish_ids, e.dessert_ids, e.main_selection_type, e.created_at";

/// Repository for events.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Events of a group, newest date first.
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_events");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events e
            JOIN group_members gm ON gm.group_id = e.group_id AND gm.user_id = $2
            WHERE e.group_id = $1
            ORDER BY e.event_date DESC, e.created_at DESC
            "#
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// An event, only if the user belongs to its group.
    pub async fn find_for_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_for_user");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events e
            JOIN group_members gm ON gm.group_id = e.group_id AND gm.user_id = $2
            WHERE e.id = $1
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// An event by id. Only for callers already authorized through a guest
    /// token for this event.
    pub async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events e
            WHERE e.id = $1
            "#
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create an event in a group the user belongs to. `None` if not a member.
    /// Menu ids must already have been checked against the group's library.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateEventRequest,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            WITH member AS (
                SELECT group_id FROM group_members WHERE group_id = $1 AND user_id = $2
            )
            INSERT INTO events AS e (
                group_id, title, description, event_date,
                appetizer_ids, main_dish_ids, dessert_ids, main_selection_type
            )
            SELECT member.group_id, $3, $4, $5, $6, $7, $8, $9 FROM member
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(request.group_id)
        .bind(user_id)
        .bind(request.title.trim())
        .bind(request.description.as_deref())
        .bind(request.event_date)
        .bind(&request.appetizer_ids)
        .bind(&request.main_dish_ids)
        .bind(&request.dessert_ids)
        .bind(MainSelectionTypeDb::from(request.main_selection_type))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Move an event to another status. Any transition is allowed.
    pub async fn update_status(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        status: EventStatusDb,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_event_status");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            UPDATE events AS e SET status = $3
            FROM group_members gm
            WHERE e.id = $1 AND gm.group_id = e.group_id AND gm.user_id = $2
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
