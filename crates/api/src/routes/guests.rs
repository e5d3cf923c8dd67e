//! Guest list routes for hosts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::guest::{
    FeedbackEmail, GuestLinksResponse, HostGuestView, InviteGuestRequest,
};
use domain::models::{Guest, GuestLinks};
use persistence::repositories::GuestRepository;
use serde::Deserialize;
use shared::crypto::{generate_magic_token, token_fingerprint};
use shared::validation::normalize_email;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{is_unique_violation, ApiError};
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_guest_invited;
use crate::routes::events::event_for_host;

/// Path parameters for a single guest.
#[derive(Debug, Deserialize)]
pub struct GuestPath {
    pub event_id: Uuid,
    pub guest_id: Uuid,
}

fn guest_not_found() -> ApiError {
    ApiError::NotFound("Guest not found".to_string())
}

/// Guests of an event with their menu and feedback links.
///
/// GET /api/v1/events/:event_id/guests
pub async fn list_guests(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<HostGuestView>>, ApiError> {
    // An empty list must not hide a missing event.
    event_for_host(&state, event_id, auth.user_id).await?;

    let base_url = state.public_base_url();
    let guests = GuestRepository::new(state.pool.clone())
        .list_for_event(event_id, auth.user_id)
        .await?
        .into_iter()
        .map(|entity| HostGuestView::new(entity.into(), base_url))
        .collect();

    Ok(Json(guests))
}

/// Invite a guest by email. Each email may be invited once per event.
///
/// POST /api/v1/events/:event_id/guests
pub async fn invite_guest(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(event_id): Path<Uuid>,
    Json(request): Json<InviteGuestRequest>,
) -> Result<(StatusCode, Json<HostGuestView>), ApiError> {
    state.ensure_can_mutate(&auth)?;
    request.validate()?;

    let email = normalize_email(&request.email);
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let magic_token = generate_magic_token();

    let guest: Guest = GuestRepository::new(state.pool.clone())
        .create(event_id, auth.user_id, &email, name, &magic_token)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::AlreadyInvited
            } else {
                e.into()
            }
        })?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?
        .into();

    record_guest_invited();
    info!(
        guest_id = %guest.id,
        event_id = %event_id,
        token_fp = %token_fingerprint(&magic_token),
        "Guest invited"
    );

    Ok((
        StatusCode::CREATED,
        Json(HostGuestView::new(guest, state.public_base_url())),
    ))
}

/// Uninvite a guest. Their selection, vote and feedback go with them.
///
/// DELETE /api/v1/events/:event_id/guests/:guest_id
pub async fn remove_guest(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(path): Path<GuestPath>,
) -> Result<StatusCode, ApiError> {
    state.ensure_can_mutate(&auth)?;

    let removed = GuestRepository::new(state.pool.clone())
        .delete(path.guest_id, path.event_id, auth.user_id)
        .await?;
    if !removed {
        return Err(guest_not_found());
    }

    info!(guest_id = %path.guest_id, event_id = %path.event_id, "Guest removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Links for one guest plus a thank-you email asking for feedback.
///
/// GET /api/v1/events/:event_id/guests/:guest_id/links
pub async fn get_guest_links(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(path): Path<GuestPath>,
) -> Result<Json<GuestLinksResponse>, ApiError> {
    let event = event_for_host(&state, path.event_id, auth.user_id).await?;
    let guest: Guest = GuestRepository::new(state.pool.clone())
        .find_for_user(path.guest_id, path.event_id, auth.user_id)
        .await?
        .ok_or_else(guest_not_found)?
        .into();

    let links = GuestLinks::build(state.public_base_url(), event.id, &guest.magic_token);
    let feedback_email =
        FeedbackEmail::compose(&event.title, guest.name.as_deref(), &links.feedback_url);

    Ok(Json(GuestLinksResponse {
        guest_id: guest.id,
        links,
        feedback_email,
    }))
}
