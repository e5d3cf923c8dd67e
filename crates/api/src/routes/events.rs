//! Event routes: composing menus, status changes and the host summaries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::event::{CreateEventRequest, UpdateEventStatusRequest};
use domain::models::{Dish, Event, Guest};
use domain::services::{aggregate_demand, summarize_feedback, DemandInput, DemandSummary, FeedbackSummary};
use persistence::repositories::{
    DishRepository, EventRepository, GroupRepository, GuestRepository, GuestResponseRepository,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

fn event_not_found() -> ApiError {
    ApiError::NotFound("Event not found".to_string())
}

/// An event the caller can see through one of their groups.
pub(crate) async fn event_for_host(
    state: &AppState,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Event, ApiError> {
    EventRepository::new(state.pool.clone())
        .find_for_user(event_id, user_id)
        .await?
        .map(Into::into)
        .ok_or_else(event_not_found)
}

/// Dishes referenced by an event's menu, including ones deleted since.
pub(crate) async fn menu_dishes(state: &AppState, event: &Event) -> Result<Vec<Dish>, ApiError> {
    Ok(DishRepository::new(state.pool.clone())
        .find_in_group(event.group_id, &event.all_dish_ids())
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

async fn guests_of(state: &AppState, event_id: Uuid, user_id: Uuid) -> Result<Vec<Guest>, ApiError> {
    Ok(GuestRepository::new(state.pool.clone())
        .list_for_event(event_id, user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Response for event detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    /// Menu dishes in course order, recipes included
    pub dishes: Vec<Dish>,
    pub guest_count: usize,
    pub responded_count: usize,
}

/// Compose an event from the group's dish library.
///
/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    state.ensure_can_mutate(&auth)?;
    request.validate()?;

    GroupRepository::new(state.pool.clone())
        .find_for_user(request.group_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let library: Vec<Dish> = DishRepository::new(state.pool.clone())
        .list_for_group(request.group_id, auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    request.check_menu(&library)?;

    let event: Event = EventRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?
        .into();

    info!(
        event_id = %event.id,
        group_id = %event.group_id,
        dish_count = event.all_dish_ids().len(),
        "Event created"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

/// Event detail with its menu and response counts.
///
/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventDetail>, ApiError> {
    let event = event_for_host(&state, event_id, auth.user_id).await?;
    let library = menu_dishes(&state, &event).await?;
    let guests = guests_of(&state, event_id, auth.user_id).await?;

    let dishes = event
        .all_dish_ids()
        .into_iter()
        .filter_map(|id| library.iter().find(|d| d.id == id).cloned())
        .collect();

    Ok(Json(EventDetail {
        dishes,
        guest_count: guests.len(),
        responded_count: guests.iter().filter(|g| g.has_responded).count(),
        event,
    }))
}

/// Move an event between draft, active and closed. Any transition is allowed.
///
/// PUT /api/v1/events/:event_id/status
pub async fn update_event_status(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(event_id): Path<Uuid>,
    Json(request): Json<UpdateEventStatusRequest>,
) -> Result<Json<Event>, ApiError> {
    state.ensure_can_mutate(&auth)?;

    let event: Event = EventRepository::new(state.pool.clone())
        .update_status(event_id, auth.user_id, request.status.into())
        .await?
        .ok_or_else(event_not_found)?
        .into();

    info!(event_id = %event_id, status = %event.status, "Event status changed");
    Ok(Json(event))
}

/// Order summary: servings per dish, dessert tally and shopping list.
///
/// GET /api/v1/events/:event_id/summary
pub async fn get_event_summary(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<DemandSummary>, ApiError> {
    let event = event_for_host(&state, event_id, auth.user_id).await?;
    let dishes = menu_dishes(&state, &event).await?;
    let guests = guests_of(&state, event_id, auth.user_id).await?;

    let responses = GuestResponseRepository::new(state.pool.clone());
    let selections: Vec<_> = responses
        .list_selections(event_id, auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let votes: Vec<_> = responses
        .list_votes(event_id, auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let summary = aggregate_demand(DemandInput {
        event: &event,
        dishes: &dishes,
        selections: &selections,
        votes: &votes,
        guest_count: guests.len(),
        responded_count: guests.iter().filter(|g| g.has_responded).count(),
    });

    Ok(Json(summary))
}

/// Feedback table: ratings per dish and each guest's comments.
///
/// GET /api/v1/events/:event_id/feedback
pub async fn get_event_feedback(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<FeedbackSummary>, ApiError> {
    let event = event_for_host(&state, event_id, auth.user_id).await?;
    let dishes = menu_dishes(&state, &event).await?;
    let guests = guests_of(&state, event_id, auth.user_id).await?;

    let responses = GuestResponseRepository::new(state.pool.clone());
    let dish_feedback: Vec<_> = responses
        .list_dish_feedback(event_id, auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let event_feedback: Vec<_> = responses
        .list_event_feedback(event_id, auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(summarize_feedback(
        &event,
        &dishes,
        &guests,
        &dish_feedback,
        &event_feedback,
    )))
}
