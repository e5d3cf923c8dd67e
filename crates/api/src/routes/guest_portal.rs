//! Guest-facing routes, authorized by the magic token from the invitation.
//!
//! Reads take the token from the query string; submissions carry the guest
//! id and token in the body and are re-verified before anything is written.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::guest_view::{
    GuestEventInfo, GuestFeedbackView, GuestMenu, GuestMenuView, GuestSelf,
};
use domain::models::response::{SubmitFeedbackRequest, SubmitSelectionRequest};
use domain::models::{Event, Guest};
use domain::services::{
    record_feedback, record_selection, FeedbackSubmission, RecorderError, SelectionSubmission,
};
use persistence::repositories::{EventRepository, GuestRepository, GuestResponseRepository};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_feedback_submitted, record_selection_submitted};
use crate::routes::events::menu_dishes;

/// Query parameters of a guest link.
#[derive(Debug, Deserialize)]
pub struct GuestLinkQuery {
    pub token: Option<String>,
}

/// Acknowledges a saved guest submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmissionReceipt {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub saved: bool,
}

fn invitation_not_found() -> ApiError {
    ApiError::NotFound("Invitation not found".to_string())
}

fn require_token(token: Option<&str>) -> Result<&str, ApiError> {
    token
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::InvalidLink)
}

fn outcome(result: &Result<(), RecorderError>) -> &'static str {
    match result {
        Ok(()) => "saved",
        Err(e) if e.is_store_failure() => "failed",
        Err(_) => "rejected",
    }
}

/// Resolve a link to its guest and event. Wrong token and wrong event are
/// indistinguishable to the caller.
async fn open_link(
    state: &AppState,
    event_id: Uuid,
    token: &str,
) -> Result<(Guest, Event), ApiError> {
    let guest: Guest = GuestRepository::new(state.pool.clone())
        .authorize(event_id, token)
        .await?
        .ok_or_else(invitation_not_found)?
        .into();

    let event: Event = EventRepository::new(state.pool.clone())
        .find_by_id(event_id)
        .await?
        .ok_or_else(invitation_not_found)?
        .into();

    Ok((guest, event))
}

/// The menu without recipes, with the guest's current choices.
///
/// GET /api/v1/guest/events/:event_id?token=
pub async fn get_guest_menu(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<GuestLinkQuery>,
) -> Result<Json<GuestMenuView>, ApiError> {
    let token = require_token(query.token.as_deref())?;
    let (guest, event) = open_link(&state, event_id, token).await?;
    let dishes = menu_dishes(&state, &event).await?;

    let responses = GuestResponseRepository::new(state.pool.clone());
    let selection = responses.find_selection(guest.id, event.id).await?;
    let vote = responses.find_vote(guest.id, event.id).await?;

    Ok(Json(GuestMenuView {
        event: GuestEventInfo::from(&event),
        guest: GuestSelf::from(&guest),
        menu: GuestMenu::arrange(&event, &dishes),
        selected_main_id: selection.and_then(|s| s.selected_main_id),
        selected_dessert_id: vote.map(|v| v.dessert_id),
    }))
}

/// Save a guest's main choice and dessert vote. Resubmitting replaces them.
///
/// POST /api/v1/guest/events/:event_id/selection
pub async fn submit_selection(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<SubmitSelectionRequest>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    require_token(Some(request.token.as_str()))?;
    request.validate()?;

    let submission = SelectionSubmission {
        guest_id: request.guest_id,
        event_id,
        token: request.token,
        selected_main_id: request.selected_main_id,
        selected_dessert_id: request.selected_dessert_id,
    };

    let store = GuestResponseRepository::new(state.pool.clone());
    let result = record_selection(&store, &submission).await;
    record_selection_submitted(outcome(&result));
    result?;

    info!(guest_id = %submission.guest_id, event_id = %event_id, "Guest selection saved");
    Ok(Json(SubmissionReceipt {
        guest_id: submission.guest_id,
        event_id,
        saved: true,
    }))
}

/// The feedback form with whatever the guest already submitted.
///
/// GET /api/v1/guest/events/:event_id/feedback?token=
pub async fn get_guest_feedback(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<GuestLinkQuery>,
) -> Result<Json<GuestFeedbackView>, ApiError> {
    let token = require_token(query.token.as_deref())?;
    let (guest, event) = open_link(&state, event_id, token).await?;
    let dishes = menu_dishes(&state, &event).await?;

    let responses = GuestResponseRepository::new(state.pool.clone());
    let dish_feedback = responses
        .list_guest_dish_feedback(guest.id, event.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let event_feedback = responses
        .find_guest_event_feedback(guest.id, event.id)
        .await?
        .map(Into::into);

    Ok(Json(GuestFeedbackView {
        event: GuestEventInfo::from(&event),
        guest: GuestSelf::from(&guest),
        menu: GuestMenu::arrange(&event, &dishes),
        dish_feedback,
        event_feedback,
    }))
}

/// Save a guest's dish ratings and comment. Accepted in any event status.
///
/// POST /api/v1/guest/events/:event_id/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    require_token(Some(request.token.as_str()))?;
    request.validate()?;

    let submission = FeedbackSubmission {
        guest_id: request.guest_id,
        event_id,
        token: request.token,
        dish_feedback: request.dish_feedback,
        event_comment: request.event_comment,
    };

    let store = GuestResponseRepository::new(state.pool.clone());
    let result = record_feedback(&store, &submission).await;
    record_feedback_submitted(outcome(&result));
    result?;

    info!(guest_id = %submission.guest_id, event_id = %event_id, "Guest feedback saved");
    Ok(Json(SubmissionReceipt {
        guest_id: submission.guest_id,
        event_id,
        saved: true,
    }))
}
