//! Guest response entities: selections, dessert votes, feedback.

use chrono::{DateTime, Utc};
use domain::models::Rating;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for feedback_rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "feedback_rating", rename_all = "lowercase")]
pub enum RatingDb {
    Up,
    Down,
}

impl From<RatingDb> for Rating {
    fn from(db: RatingDb) -> Self {
        match db {
            RatingDb::Up => Rating::Up,
            RatingDb::Down => Rating::Down,
        }
    }
}

impl From<Rating> for RatingDb {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Up => RatingDb::Up,
            Rating::Down => RatingDb::Down,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SelectionEntity {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub selected_main_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl From<SelectionEntity> for domain::models::Selection {
    fn from(entity: SelectionEntity) -> Self {
        Self {
            guest_id: entity.guest_id,
            event_id: entity.event_id,
            selected_main_id: entity.selected_main_id,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DessertVoteEntity {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub dessert_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl From<DessertVoteEntity> for domain::models::DessertVote {
    fn from(entity: DessertVoteEntity) -> Self {
        Self {
            guest_id: entity.guest_id,
            event_id: entity.event_id,
            dessert_id: entity.dessert_id,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DishFeedbackEntity {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub dish_id: Uuid,
    pub rating: RatingDb,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<DishFeedbackEntity> for domain::models::DishFeedback {
    fn from(entity: DishFeedbackEntity) -> Self {
        Self {
            guest_id: entity.guest_id,
            event_id: entity.event_id,
            dish_id: entity.dish_id,
            rating: entity.rating.into(),
            comment: entity.comment,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EventFeedbackEntity {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub comment: String,
    pub updated_at: DateTime<Utc>,
}

impl From<EventFeedbackEntity> for domain::models::EventFeedback {
    fn from(entity: EventFeedbackEntity) -> Self {
        Self {
            guest_id: entity.guest_id,
            event_id: entity.event_id,
            comment: entity.comment,
            updated_at: entity.updated_at,
        }
    }
}
