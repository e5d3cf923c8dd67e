//! Signed-in host: profile, onboarding and dashboard.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::group::personal_group_name;
use domain::models::profile::MeResponse;
use domain::models::{Dish, Event, GroupWithRole};
use domain::services::{select_active, sort_groups};
use persistence::repositories::{DishRepository, EventRepository, GroupRepository, ProfileRepository};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Loads the caller's groups in display order.
pub(crate) async fn load_groups(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<GroupWithRole>, ApiError> {
    let mut groups: Vec<GroupWithRole> = GroupRepository::new(state.pool.clone())
        .list_for_user(user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    sort_groups(&mut groups);
    Ok(groups)
}

/// Current host profile.
///
/// GET /api/v1/me
///
/// Refreshes the profile from the identity token and creates the host's
/// personal group on first sign-in.
pub async fn get_me(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<MeResponse>, ApiError> {
    let profile = ProfileRepository::new(state.pool.clone())
        .upsert(auth.user_id, &auth.email, auth.name.as_deref())
        .await?;

    let personal = GroupRepository::new(state.pool.clone())
        .ensure_personal_group(
            auth.user_id,
            &personal_group_name(auth.name.as_deref(), &auth.email),
        )
        .await?;

    let groups = load_groups(&state, auth.user_id).await?;

    info!(
        user_id = %auth.user_id,
        personal_group_id = %personal.id,
        group_count = groups.len(),
        "Profile loaded"
    );

    Ok(Json(MeResponse {
        profile: profile.into(),
        can_create: state.hosts.can_mutate(&auth.email),
        groups,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Requested active group; ignored if the caller is not a member.
    pub group: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardResponse {
    pub active_group: GroupWithRole,
    pub groups: Vec<GroupWithRole>,
    pub dishes: Vec<Dish>,
    pub events: Vec<Event>,
    pub can_create: bool,
}

/// Dish library and events of the active group.
///
/// GET /api/v1/dashboard?group=
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let groups = load_groups(&state, auth.user_id).await?;

    let active = select_active(&groups, query.group)
        .cloned()
        .ok_or(ApiError::OnboardingRequired)?;

    if query.group.is_some_and(|requested| requested != active.id()) {
        info!(
            user_id = %auth.user_id,
            active_group_id = %active.id(),
            "Requested group not accessible, using fallback"
        );
    }

    let dishes = DishRepository::new(state.pool.clone())
        .list_for_group(active.id(), auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let events = EventRepository::new(state.pool.clone())
        .list_for_group(active.id(), auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(DashboardResponse {
        active_group: active,
        groups,
        dishes,
        events,
        can_create: state.hosts.can_mutate(&auth.email),
    }))
}
