//! Guest response repository: selections, dessert votes and feedback.
//!
//! All writes are `INSERT ... ON CONFLICT ... DO UPDATE` on the natural key,
//! so resubmitting is safe and the last write wins.

use async_trait::async_trait;
use domain::models::{Event, Guest, Rating};
use domain::services::GuestResponseStore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    DessertVoteEntity, DishFeedbackEntity, EventFeedbackEntity, RatingDb, SelectionEntity,
};
use crate::metrics::QueryTimer;
use crate::repositories::{EventRepository, GuestRepository};

/// Joins restricting host reads to events the caller's groups own.
const HOST_SCOPE: &str = "JOIN events e ON e.id = r.event_id \
     JOIN group_members gm ON gm.group_id = e.group_id AND gm.user_id = $2";

/// Repository for guest responses.
#[derive(Clone)]
pub struct GuestResponseRepository {
    pool: PgPool,
    guests: GuestRepository,
    events: EventRepository,
}

impl GuestResponseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            guests: GuestRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            pool,
        }
    }

    /// The guest's own selection.
    pub async fn find_selection(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<SelectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_selection");
        let result = sqlx::query_as::<_, SelectionEntity>(
            r#"
            SELECT guest_id, event_id, selected_main_id, updated_at
            FROM selections
            WHERE guest_id = $1 AND event_id = $2
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The guest's own dessert vote.
    pub async fn find_vote(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<DessertVoteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_vote");
        let result = sqlx::query_as::<_, DessertVoteEntity>(
            r#"
            SELECT guest_id, event_id, dessert_id, updated_at
            FROM dessert_votes
            WHERE guest_id = $1 AND event_id = $2
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The guest's own dish ratings for an event.
    pub async fn list_guest_dish_feedback(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
    ) -> Result<Vec<DishFeedbackEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_guest_dish_feedback");
        let result = sqlx::query_as::<_, DishFeedbackEntity>(
            r#"
            SELECT guest_id, event_id, dish_id, rating, comment, updated_at
            FROM dish_feedback
            WHERE guest_id = $1 AND event_id = $2
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The guest's own event comment.
    pub async fn find_guest_event_feedback(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<EventFeedbackEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_event_feedback");
        let result = sqlx::query_as::<_, EventFeedbackEntity>(
            r#"
            SELECT guest_id, event_id, comment, updated_at
            FROM event_feedback
            WHERE guest_id = $1 AND event_id = $2
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All selections of an event, for a host who can see it.
    pub async fn list_selections(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<SelectionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_selections");
        let result = sqlx::query_as::<_, SelectionEntity>(&format!(
            r#"
            SELECT r.guest_id, r.event_id, r.selected_main_id, r.updated_at
            FROM selections r
            {HOST_SCOPE}
            WHERE r.event_id = $1
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All dessert votes of an event, for a host who can see it.
    pub async fn list_votes(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<DessertVoteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_votes");
        let result = sqlx::query_as::<_, DessertVoteEntity>(&format!(
            r#"
            SELECT r.guest_id, r.event_id, r.dessert_id, r.updated_at
            FROM dessert_votes r
            {HOST_SCOPE}
            WHERE r.event_id = $1
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All dish ratings of an event, for a host who can see it.
    pub async fn list_dish_feedback(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<DishFeedbackEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_dish_feedback");
        let result = sqlx::query_as::<_, DishFeedbackEntity>(&format!(
            r#"
            SELECT r.guest_id, r.event_id, r.dish_id, r.rating, r.comment, r.updated_at
            FROM dish_feedback r
            {HOST_SCOPE}
            WHERE r.event_id = $1
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All event comments of an event, for a host who can see it.
    pub async fn list_event_feedback(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EventFeedbackEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_comments");
        let result = sqlx::query_as::<_, EventFeedbackEntity>(&format!(
            r#"
            SELECT r.guest_id, r.event_id, r.comment, r.updated_at
            FROM event_feedback r
            {HOST_SCOPE}
            WHERE r.event_id = $1
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[async_trait]
impl GuestResponseStore for GuestResponseRepository {
    async fn authorize_guest(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        token: &str,
    ) -> Result<Option<Guest>, sqlx::Error> {
        Ok(self
            .guests
            .authorize_exact(guest_id, event_id, token)
            .await?
            .map(Into::into))
    }

    async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        Ok(self.events.find_by_id(event_id).await?.map(Into::into))
    }

    async fn upsert_selection(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        selected_main_id: Option<Uuid>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_selection");
        let result = sqlx::query(
            r#"
            INSERT INTO selections (guest_id, event_id, selected_main_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (guest_id, event_id) DO UPDATE SET
                selected_main_id = EXCLUDED.selected_main_id,
                updated_at = NOW()
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .bind(selected_main_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    async fn upsert_dessert_vote(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        dessert_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_dessert_vote");
        let result = sqlx::query(
            r#"
            INSERT INTO dessert_votes (guest_id, event_id, dessert_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (guest_id, event_id) DO UPDATE SET
                dessert_id = EXCLUDED.dessert_id,
                updated_at = NOW()
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .bind(dessert_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    async fn delete_dessert_vote(&self, guest_id: Uuid, event_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("delete_dessert_vote");
        let result = sqlx::query("DELETE FROM dessert_votes WHERE guest_id = $1 AND event_id = $2")
            .bind(guest_id)
            .bind(event_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }

    async fn mark_responded(&self, guest_id: Uuid) -> Result<(), sqlx::Error> {
        self.guests.mark_responded(guest_id).await
    }

    async fn upsert_dish_feedback(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        dish_id: Uuid,
        rating: Rating,
        comment: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_dish_feedback");
        let result = sqlx::query(
            r#"
            INSERT INTO dish_feedback (guest_id, event_id, dish_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (guest_id, dish_id) DO UPDATE SET
                event_id = EXCLUDED.event_id,
                rating = EXCLUDED.rating,
                comment = EXCLUDED.comment,
                updated_at = NOW()
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .bind(dish_id)
        .bind(RatingDb::from(rating))
        .bind(comment)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    async fn upsert_event_feedback(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        comment: &str,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_event_feedback");
        let result = sqlx::query(
            r#"
            INSERT INTO event_feedback (guest_id, event_id, comment)
            VALUES ($1, $2, $3)
            ON CONFLICT (guest_id, event_id) DO UPDATE SET
                comment = EXCLUDED.comment,
                updated_at = NOW()
            "#,
        )
        .bind(guest_id)
        .bind(event_id)
        .bind(comment)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    async fn mark_feedback_submitted(&self, guest_id: Uuid) -> Result<(), sqlx::Error> {
        self.guests.mark_feedback_submitted(guest_id).await
    }
}
