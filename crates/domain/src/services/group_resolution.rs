//! Group membership resolution.
//!
//! Orders a user's groups and picks the one a request operates in. Membership
//! itself is proven by the repository join; these functions only order and
//! fall back over rows the user is already a member of.

use uuid::Uuid;

use crate::models::GroupWithRole;

/// Orders groups personal-first, then by name (case-insensitive), then id.
pub fn sort_groups(groups: &mut [GroupWithRole]) {
    groups.sort_by(|a, b| {
        b.group
            .is_personal
            .cmp(&a.group.is_personal)
            .then_with(|| {
                a.group
                    .name
                    .to_lowercase()
                    .cmp(&b.group.name.to_lowercase())
            })
            .then_with(|| a.group.id.cmp(&b.group.id))
    });
}

/// Picks the active group from the user's memberships.
///
/// A requested group the user does not belong to is treated as if nothing
/// was requested. The fallback is the personal group, then the first group in
/// [`sort_groups`] order. `None` means the user has no groups yet.
pub fn select_active(groups: &[GroupWithRole], requested: Option<Uuid>) -> Option<&GroupWithRole> {
    requested
        .and_then(|id| groups.iter().find(|g| g.group.id == id))
        .or_else(|| groups.iter().find(|g| g.group.is_personal))
        .or_else(|| groups.first())
}
