//! Group management routes: shared kitchens and their members.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::group::{
    AddMemberRequest, CreateGroupRequest, DeleteGroupQuery, GroupDetail, UpdateMemberRoleRequest,
};
use domain::models::{GroupMember, GroupRole, GroupWithRole};
use persistence::repositories::{GroupRepository, ProfileRepository};
use shared::validation::normalize_email;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{is_unique_violation, ApiError};
use crate::extractors::UserAuth;
use crate::routes::me::load_groups;

/// The caller's membership of a group, or 404 if they have none.
async fn membership(
    repo: &GroupRepository,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupWithRole, ApiError> {
    repo.find_for_user(group_id, user_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))
}

fn require_member_manager(group: &GroupWithRole) -> Result<(), ApiError> {
    if group.your_role.can_manage_members() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only owners and admins can manage members".to_string(),
        ))
    }
}

/// Owners are set at creation; member management only assigns admin/member.
fn assignable_role(role: GroupRole) -> Result<GroupRole, ApiError> {
    match role {
        GroupRole::Owner => Err(ApiError::Validation(
            "The owner role cannot be assigned".to_string(),
        )),
        other => Ok(other),
    }
}

/// List groups the current user belongs to, personal group first.
///
/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<GroupWithRole>>, ApiError> {
    Ok(Json(load_groups(&state, auth.user_id).await?))
}

/// Create a shared group. The creator becomes its owner.
///
/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupWithRole>), ApiError> {
    request.validate()?;

    let group = GroupRepository::new(state.pool.clone())
        .create_group(
            auth.user_id,
            request.name.trim(),
            request.description.as_deref(),
        )
        .await?;

    info!(group_id = %group.id, user_id = %auth.user_id, "Group created");

    Ok((
        StatusCode::CREATED,
        Json(GroupWithRole {
            group: group.into(),
            your_role: GroupRole::Owner,
        }),
    ))
}

/// Group details with its members.
///
/// GET /api/v1/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetail>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let group = membership(&repo, group_id, auth.user_id).await?;

    let members: Vec<GroupMember> = repo
        .list_members(group_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(GroupDetail {
        can_manage_members: group.your_role.can_manage_members(),
        can_delete: group.your_role.can_delete_group(group.group.is_personal),
        group,
        members,
    }))
}

/// Delete a shared group with everything in it.
///
/// DELETE /api/v1/groups/:group_id?confirm=<group name>
///
/// Owner only; personal groups cannot be deleted.
pub async fn delete_group(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Query(query): Query<DeleteGroupQuery>,
) -> Result<StatusCode, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let group = membership(&repo, group_id, auth.user_id).await?;

    if group.group.is_personal {
        return Err(ApiError::Forbidden(
            "Personal groups cannot be deleted".to_string(),
        ));
    }
    if !group.your_role.can_delete_group(group.group.is_personal) {
        return Err(ApiError::Forbidden(
            "Only the owner can delete this group".to_string(),
        ));
    }
    if query.confirm != group.group.name {
        return Err(ApiError::Validation(
            "Confirmation must match the group name".to_string(),
        ));
    }

    if !repo.delete_group(group_id).await? {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    info!(group_id = %group_id, user_id = %auth.user_id, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Add an existing user to a group by email.
///
/// POST /api/v1/groups/:group_id/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<Vec<GroupMember>>), ApiError> {
    request.validate()?;
    let role = assignable_role(request.role)?;

    let repo = GroupRepository::new(state.pool.clone());
    let group = membership(&repo, group_id, auth.user_id).await?;
    require_member_manager(&group)?;

    let profile = ProfileRepository::new(state.pool.clone())
        .find_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("No account found for that email. They need to sign in first.".to_string())
        })?;

    repo.add_member(group_id, profile.id, role.into())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Already a member of this group".to_string())
            } else {
                e.into()
            }
        })?;

    info!(
        group_id = %group_id,
        member_id = %profile.id,
        role = %role,
        "Group member added"
    );

    let members = repo
        .list_members(group_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok((StatusCode::CREATED, Json(members)))
}

/// Change a member's role between admin and member.
///
/// PUT /api/v1/groups/:group_id/members/:user_id
pub async fn update_member_role(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> Result<StatusCode, ApiError> {
    let role = assignable_role(request.role)?;

    let repo = GroupRepository::new(state.pool.clone());
    let group = membership(&repo, group_id, auth.user_id).await?;
    require_member_manager(&group)?;

    if !repo
        .update_member_role(group_id, member_id, role.into())
        .await?
    {
        return Err(ApiError::NotFound(
            "Member not found or cannot be changed".to_string(),
        ));
    }

    info!(group_id = %group_id, member_id = %member_id, role = %role, "Member role updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a member. The owner cannot be removed.
///
/// DELETE /api/v1/groups/:group_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let group = membership(&repo, group_id, auth.user_id).await?;
    require_member_manager(&group)?;

    if !repo.remove_member(group_id, member_id).await? {
        return Err(ApiError::NotFound(
            "Member not found or cannot be removed".to_string(),
        ));
    }

    info!(group_id = %group_id, member_id = %member_id, "Group member removed");
    Ok(StatusCode::NO_CONTENT)
}
