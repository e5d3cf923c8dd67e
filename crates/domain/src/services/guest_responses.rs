//! Recording guest selections, dessert votes and feedback.
//!
//! Every write is preceded by a server-side check of (guest_id, event_id,
//! token); client-supplied ids are never trusted on their own. Writes are
//! upserts on natural keys and run in sequence without a wrapping
//! transaction. The final status flag flip marks a submission complete, and a
//! failed submission can be resent as-is.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::response::DishFeedbackInput;
use crate::models::{Event, Guest, MainSelectionType, Rating};

/// Storage operations the recorders need.
#[async_trait]
pub trait GuestResponseStore: Send + Sync {
    /// Returns the guest only if all three values match one row exactly.
    async fn authorize_guest(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        token: &str,
    ) -> Result<Option<Guest>, sqlx::Error>;

    async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error>;

    async fn upsert_selection(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        selected_main_id: Option<Uuid>,
    ) -> Result<(), sqlx::Error>;

    async fn upsert_dessert_vote(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        dessert_id: Uuid,
    ) -> Result<(), sqlx::Error>;

    async fn delete_dessert_vote(&self, guest_id: Uuid, event_id: Uuid)
        -> Result<(), sqlx::Error>;

    async fn mark_responded(&self, guest_id: Uuid) -> Result<(), sqlx::Error>;

    async fn upsert_dish_feedback(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        dish_id: Uuid,
        rating: Rating,
        comment: Option<&str>,
    ) -> Result<(), sqlx::Error>;

    async fn upsert_event_feedback(
        &self,
        guest_id: Uuid,
        event_id: Uuid,
        comment: &str,
    ) -> Result<(), sqlx::Error>;

    async fn mark_feedback_submitted(&self, guest_id: Uuid) -> Result<(), sqlx::Error>;
}

/// Failure of a recorder call. Each write step has its own variant.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Invalid guest or token")]
    InvalidGuestOrToken,

    #[error("{0}")]
    Invalid(String),

    #[error("Selections are closed for this event")]
    SelectionsClosed,

    #[error("Failed to verify guest")]
    Verify(#[source] sqlx::Error),

    #[error("Failed to save selection")]
    SelectionSave(#[source] sqlx::Error),

    #[error("Failed to save dessert vote")]
    VoteSave(#[source] sqlx::Error),

    #[error("Failed to remove dessert vote")]
    VoteRetract(#[source] sqlx::Error),

    #[error("Failed to update guest status")]
    StatusUpdate(#[source] sqlx::Error),

    #[error("Failed to save feedback for dish {dish_id}")]
    DishFeedbackSave {
        dish_id: Uuid,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to save event feedback")]
    EventFeedbackSave(#[source] sqlx::Error),

    #[error("Failed to update feedback status")]
    FeedbackStatusUpdate(#[source] sqlx::Error),
}

impl RecorderError {
    /// Name of the step that failed, for logs.
    pub fn step(&self) -> &'static str {
        match self {
            RecorderError::InvalidGuestOrToken | RecorderError::Verify(_) => "verify_guest",
            RecorderError::Invalid(_) | RecorderError::SelectionsClosed => "validate",
            RecorderError::SelectionSave(_) => "save_selection",
            RecorderError::VoteSave(_) => "save_dessert_vote",
            RecorderError::VoteRetract(_) => "retract_dessert_vote",
            RecorderError::StatusUpdate(_) => "mark_responded",
            RecorderError::DishFeedbackSave { .. } => "save_dish_feedback",
            RecorderError::EventFeedbackSave(_) => "save_event_feedback",
            RecorderError::FeedbackStatusUpdate(_) => "mark_feedback_submitted",
        }
    }

    /// The message followed by the store error that caused it, if any.
    pub fn detail(&self) -> String {
        match std::error::Error::source(self) {
            Some(cause) => format!("{}: {}", self, cause),
            None => self.to_string(),
        }
    }

    /// True when the store failed, as opposed to a rejected submission.
    pub fn is_store_failure(&self) -> bool {
        !matches!(
            self,
            RecorderError::InvalidGuestOrToken
                | RecorderError::Invalid(_)
                | RecorderError::SelectionsClosed
        )
    }
}

/// A guest's menu choice as submitted.
#[derive(Debug, Clone)]
pub struct SelectionSubmission {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub token: String,
    pub selected_main_id: Option<Uuid>,
    pub selected_dessert_id: Option<Uuid>,
}

/// A guest's feedback as submitted.
#[derive(Debug, Clone)]
pub struct FeedbackSubmission {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub token: String,
    pub dish_feedback: Vec<DishFeedbackInput>,
    pub event_comment: Option<String>,
}

async fn verify<S: GuestResponseStore + ?Sized>(
    store: &S,
    guest_id: Uuid,
    event_id: Uuid,
    token: &str,
) -> Result<(Guest, Event), RecorderError> {
    let guest = store
        .authorize_guest(guest_id, event_id, token)
        .await
        .map_err(RecorderError::Verify)?
        .ok_or(RecorderError::InvalidGuestOrToken)?;

    let event = store
        .find_event(event_id)
        .await
        .map_err(RecorderError::Verify)?
        .ok_or(RecorderError::InvalidGuestOrToken)?;

    Ok((guest, event))
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Records a guest's main selection and dessert vote.
pub async fn record_selection<S: GuestResponseStore + ?Sized>(
    store: &S,
    submission: &SelectionSubmission,
) -> Result<(), RecorderError> {
    let (guest, event) = verify(
        store,
        submission.guest_id,
        submission.event_id,
        &submission.token,
    )
    .await?;

    if !event.status.accepts_selections() {
        return Err(RecorderError::SelectionsClosed);
    }

    let selected_main_id = match event.main_selection_type {
        MainSelectionType::Fixed => None,
        MainSelectionType::ChooseOne => submission.selected_main_id,
    };
    if let Some(main_id) = selected_main_id {
        if !event.main_dish_ids.contains(&main_id) {
            return Err(RecorderError::Invalid(
                "Selected main course is not on this menu".to_string(),
            ));
        }
    }
    if let Some(dessert_id) = submission.selected_dessert_id {
        if !event.dessert_ids.contains(&dessert_id) {
            return Err(RecorderError::Invalid(
                "Selected dessert is not on this menu".to_string(),
            ));
        }
    }

    let result = async {
        store
            .upsert_selection(guest.id, event.id, selected_main_id)
            .await
            .map_err(RecorderError::SelectionSave)?;

        match submission.selected_dessert_id {
            Some(dessert_id) => store
                .upsert_dessert_vote(guest.id, event.id, dessert_id)
                .await
                .map_err(RecorderError::VoteSave)?,
            None => store
                .delete_dessert_vote(guest.id, event.id)
                .await
                .map_err(RecorderError::VoteRetract)?,
        }

        store
            .mark_responded(guest.id)
            .await
            .map_err(RecorderError::StatusUpdate)
    }
    .await;

    match &result {
        Ok(()) => debug!(guest_id = %guest.id, event_id = %event.id, "Selection recorded"),
        Err(e) => warn!(
            guest_id = %guest.id,
            event_id = %event.id,
            step = e.step(),
            error = %e.detail(),
            "Selection only partially recorded"
        ),
    }

    result
}

/// Records a guest's dish ratings and event comment.
pub async fn record_feedback<S: GuestResponseStore + ?Sized>(
    store: &S,
    submission: &FeedbackSubmission,
) -> Result<(), RecorderError> {
    let (guest, event) = verify(
        store,
        submission.guest_id,
        submission.event_id,
        &submission.token,
    )
    .await?;

    let rated: Vec<(&DishFeedbackInput, Rating)> = submission
        .dish_feedback
        .iter()
        .filter_map(|entry| entry.rating.map(|rating| (entry, rating)))
        .collect();

    if let Some((entry, _)) = rated.iter().find(|(e, _)| !event.has_dish(e.dish_id)) {
        return Err(RecorderError::Invalid(format!(
            "Dish {} is not on this menu",
            entry.dish_id
        )));
    }

    let result = async {
        for (entry, rating) in &rated {
            store
                .upsert_dish_feedback(
                    guest.id,
                    event.id,
                    entry.dish_id,
                    *rating,
                    non_blank(entry.comment.as_deref()),
                )
                .await
                .map_err(|source| RecorderError::DishFeedbackSave {
                    dish_id: entry.dish_id,
                    source,
                })?;
        }

        if let Some(comment) = non_blank(submission.event_comment.as_deref()) {
            store
                .upsert_event_feedback(guest.id, event.id, comment)
                .await
                .map_err(RecorderError::EventFeedbackSave)?;
        }

        store
            .mark_feedback_submitted(guest.id)
            .await
            .map_err(RecorderError::FeedbackStatusUpdate)
    }
    .await;

    match &result {
        Ok(()) => debug!(
            guest_id = %guest.id,
            event_id = %event.id,
            dishes = rated.len(),
            "Feedback recorded"
        ),
        Err(e) => warn!(
            guest_id = %guest.id,
            event_id = %event.id,
            step = e.step(),
            error = %e.detail(),
            "Feedback only partially recorded"
        ),
    }

    result
}
