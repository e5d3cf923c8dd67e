//! Group domain models for the tenants that own dishes and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Owner,
    Admin,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Owner => "owner",
            GroupRole::Admin => "admin",
            GroupRole::Member => "member",
        }
    }

    /// Returns true if this role can add, remove and re-role non-owner members
    pub fn can_manage_members(&self) -> bool {
        matches!(self, GroupRole::Owner | GroupRole::Admin)
    }

    /// Returns true if this role can delete the group. Personal groups are
    /// never deletable.
    pub fn can_delete_group(&self, is_personal: bool) -> bool {
        matches!(self, GroupRole::Owner) && !is_personal
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(GroupRole::Owner),
            "admin" => Ok(GroupRole::Admin),
            "member" => Ok(GroupRole::Member),
            _ => Err(format!("Invalid group role: {}", s)),
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A group (tenant) that owns dishes and events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub is_personal: bool,
    pub created_at: DateTime<Utc>,
}

/// A group together with the caller's role in it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupWithRole {
    #[serde(flatten)]
    pub group: Group,
    pub your_role: GroupRole,
}

impl GroupWithRole {
    pub fn id(&self) -> Uuid {
        self.group.id
    }
}

/// A group member joined with their profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupMember {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Request payload for creating a shared group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Request payload for adding a member by email.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddMemberRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(default = "default_member_role")]
    pub role: GroupRole,
}

fn default_member_role() -> GroupRole {
    GroupRole::Member
}

/// Request payload for changing a member's role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateMemberRoleRequest {
    pub role: GroupRole,
}

/// Query for deleting a group; `confirm` must repeat the group name.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteGroupQuery {
    #[serde(default)]
    pub confirm: String,
}

/// Response for group detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: GroupWithRole,
    pub can_manage_members: bool,
    pub can_delete: bool,
    pub members: Vec<GroupMember>,
}

/// Name given to a user's auto-created personal group.
pub fn personal_group_name(display_name: Option<&str>, email: &str) -> String {
    let owner = display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email));
    format!("{}'s Kitchen", owner)
}
