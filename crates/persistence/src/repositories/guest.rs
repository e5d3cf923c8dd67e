//! Guest repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GuestEntity;
use crate::metrics::QueryTimer;

const GUEST_COLUMNS: &str = "g.id, g.event_id, g.email, g.name, g.magic_token, g.has_responded, \
     g.has_submitted_feedback, g.created_at";

/// Repository for invited guests.
#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Guest whose magic token matches exactly, scoped to one event.
    pub async fn authorize(
        &self,
        event_id: Uuid,
        token: &str,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("authorize_guest");
        let result = sqlx::query_as::<_, GuestEntity>(&format!(
            r#"
            SELECT {GUEST_COLUMNS}
            FROM guests g
            WHERE g.event_id = $1 AND g.magic_token = $2
            "#
        ))
        .bind(event_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Same as [`authorize`](Self::authorize) but also pins the guest id the
    /// client claims to be.
    pub async fn authorize_exact(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        token: &str,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("authorize_guest_exact");
        let result = sqlx::query_as::<_, GuestEntity>(&format!(
            r#"
            SELECT {GUEST_COLUMNS}
            FROM guests g
            WHERE g.id = $1 AND g.event_id = $2 AND g.magic_token = $3
            "#
        ))
        .bind(guest_id)
        .bind(event_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Guests of an event the user can see, in invitation order.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_guests");
        let result = sqlx::query_as::<_, GuestEntity>(&format!(
            r#"
            SELECT {GUEST_COLUMNS}
            FROM guests g
            JOIN events e ON e.id = g.event_id
            JOIN group_members gm ON gm.group_id = e.group_id AND gm.user_id = $2
            WHERE g.event_id = $1
            ORDER BY g.created_at, g.email
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// One guest of an event the user can see.
    pub async fn find_for_user(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_for_user");
        let result = sqlx::query_as::<_, GuestEntity>(&format!(
            r#"
            SELECT {GUEST_COLUMNS}
            FROM guests g
            JOIN events e ON e.id = g.event_id
            JOIN group_members gm ON gm.group_id = e.group_id AND gm.user_id = $3
            WHERE g.id = $1 AND g.event_id = $2
            "#
        ))
        .bind(guest_id)
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Invite a guest. A second invite for the same (event, email) fails with
    /// a unique violation. `None` if the user cannot see the event.
    pub async fn create(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        email: &str,
        name: Option<&str>,
        magic_token: &str,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_guest");
        let result = sqlx::query_as::<_, GuestEntity>(&format!(
            r#"
            WITH visible AS (
                SELECT e.id FROM events e
                JOIN group_members gm ON gm.group_id = e.group_id AND gm.user_id = $2
                WHERE e.id = $1
            )
            INSERT INTO guests AS g (event_id, email, name, magic_token)
            SELECT visible.id, $3, $4, $5 FROM visible
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(email)
        .bind(name)
        .bind(magic_token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove a guest and, by cascade, their responses.
    pub async fn delete(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_guest");
        let result = sqlx::query(
            r#"
            DELETE FROM guests g
            USING events e, group_members gm
            WHERE g.id = $1
              AND g.event_id = $2
              AND e.id = g.event_id
              AND gm.group_id = e.group_id
              AND gm.user_id = $3
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn mark_responded(&self, guest_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_guest_responded");
        let result = sqlx::query("UPDATE guests SET has_responded = true WHERE id = $1")
            .bind(guest_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn mark_feedback_submitted(&self, guest_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_guest_feedback_submitted");
        let result = sqlx::query("UPDATE guests SET has_submitted_feedback = true WHERE id = $1")
            .bind(guest_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }
}
