//! Group entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::group::{GroupMember, GroupRole, GroupWithRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for group_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
pub enum GroupRoleDb {
    Owner,
    Admin,
    Member,
}

impl From<GroupRoleDb> for GroupRole {
    fn from(db_role: GroupRoleDb) -> Self {
        match db_role {
            GroupRoleDb::Owner => GroupRole::Owner,
            GroupRoleDb::Admin => GroupRole::Admin,
            GroupRoleDb::Member => GroupRole::Member,
        }
    }
}

impl From<GroupRole> for GroupRoleDb {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Owner => GroupRoleDb::Owner,
            GroupRole::Admin => GroupRoleDb::Admin,
            GroupRole::Member => GroupRoleDb::Member,
        }
    }
}

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub is_personal: bool,
    pub created_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            owner_id: entity.owner_id,
            is_personal: entity.is_personal,
            created_at: entity.created_at,
        }
    }
}

/// A group row joined with the caller's membership role.
#[derive(Debug, Clone, FromRow)]
pub struct GroupWithRoleEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub is_personal: bool,
    pub created_at: DateTime<Utc>,
    pub role: GroupRoleDb,
}

impl From<GroupWithRoleEntity> for GroupWithRole {
    fn from(entity: GroupWithRoleEntity) -> Self {
        Self {
            group: domain::models::Group {
                id: entity.id,
                name: entity.name,
                description: entity.description,
                owner_id: entity.owner_id,
                is_personal: entity.is_personal,
                created_at: entity.created_at,
            },
            your_role: entity.role.into(),
        }
    }
}

/// Member row joined with the member's profile.
#[derive(Debug, Clone, FromRow)]
pub struct MemberWithProfileEntity {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
}

impl From<MemberWithProfileEntity> for GroupMember {
    fn from(entity: MemberWithProfileEntity) -> Self {
        Self {
            user_id: entity.user_id,
            email: entity.email,
            name: entity.name,
            role: entity.role.into(),
            joined_at: entity.joined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion_both_ways() {
        for role in [GroupRole::Owner, GroupRole::Admin, GroupRole::Member] {
            let db: GroupRoleDb = role.into();
            assert_eq!(GroupRole::from(db), role);
        }
    }

    #[test]
    fn test_group_with_role_entity_conversion() {
        let entity = GroupWithRoleEntity {
            id: Uuid::new_v4(),
            name: "Supper Club".to_string(),
            description: None,
            owner_id: Uuid::new_v4(),
            is_personal: false,
            created_at: Utc::now(),
            role: GroupRoleDb::Admin,
        };
        let id = entity.id;
        let gwr: GroupWithRole = entity.into();
        assert_eq!(gwr.id(), id);
        assert_eq!(gwr.your_role, GroupRole::Admin);
    }
}
