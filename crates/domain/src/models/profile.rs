//! Host profile, mirrored from the identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::GroupWithRole;

/// A signed-in host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response for `GET /me`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MeResponse {
    pub profile: Profile,
    /// Whether this host may create or edit dishes and events.
    pub can_create: bool,
    pub groups: Vec<GroupWithRole>,
}
