//! Guest responses: menu selections, dessert votes and feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// A guest's main-course choice. One per (guest, event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Selection {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub selected_main_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// A guest's dessert vote. At most one per (guest, event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DessertVote {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub dessert_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

/// Thumbs up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Up => "up",
            Rating::Down => "down",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A guest's rating of one dish. One per (guest, dish).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DishFeedback {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub dish_id: Uuid,
    pub rating: Rating,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A guest's overall comment on an event. At most one per (guest, event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventFeedback {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub comment: String,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for a guest's menu selection.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SubmitSelectionRequest {
    pub guest_id: Uuid,

    #[validate(length(min = 1, max = 128, message = "Invalid link"))]
    pub token: String,

    pub selected_main_id: Option<Uuid>,
    pub selected_dessert_id: Option<Uuid>,
}

/// One dish row of a feedback form. Rows without a rating are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct DishFeedbackInput {
    pub dish_id: Uuid,
    pub rating: Option<Rating>,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Request payload for a guest's feedback.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SubmitFeedbackRequest {
    pub guest_id: Uuid,

    #[validate(length(min = 1, max = 128, message = "Invalid link"))]
    pub token: String,

    #[serde(default)]
    #[validate(nested)]
    pub dish_feedback: Vec<DishFeedbackInput>,

    #[validate(length(max = 5000, message = "Comment must be at most 5000 characters"))]
    pub event_comment: Option<String>,
}
