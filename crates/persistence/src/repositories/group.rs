//! Group repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupEntity, GroupRoleDb, GroupWithRoleEntity, MemberWithProfileEntity};
use crate::metrics::QueryTimer;

/// Repository for group and membership database operations.
///
/// Every read that returns group data joins `group_members` on the caller's
/// user id, so a non-member sees nothing.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a group and add the creator as its owner, atomically.
    pub async fn create_group(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_group");
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupEntity>(
            r#"
            INSERT INTO groups (name, description, owner_id, is_personal)
            VALUES ($1, $2, $3, false)
            RETURNING id, name, description, owner_id, is_personal, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role)
            VALUES ($1, $2, 'owner')
            "#,
        )
        .bind(group.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(group)
    }

    /// Returns the user's personal group, creating it (and the owner
    /// membership) on first call. Safe to call concurrently.
    pub async fn ensure_personal_group(
        &self,
        owner_id: Uuid,
        name: &str,
    ) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("ensure_personal_group");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO groups (name, owner_id, is_personal)
            VALUES ($1, $2, true)
            ON CONFLICT (owner_id) WHERE is_personal DO NOTHING
            "#,
        )
        .bind(name)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let group = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, description, owner_id, is_personal, created_at
            FROM groups
            WHERE owner_id = $1 AND is_personal
            "#,
        )
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role)
            VALUES ($1, $2, 'owner')
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(group)
    }

    /// All groups the user belongs to, with their role, personal group first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupWithRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_user_groups");
        let result = sqlx::query_as::<_, GroupWithRoleEntity>(
            r#"
            SELECT g.id, g.name, g.description, g.owner_id, g.is_personal, g.created_at, gm.role
            FROM groups g
            JOIN group_members gm ON gm.group_id = g.id
            WHERE gm.user_id = $1
            ORDER BY g.is_personal DESC, LOWER(g.name), g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A single group, only if the user is a member of it.
    pub async fn find_for_user(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupWithRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_for_user");
        let result = sqlx::query_as::<_, GroupWithRoleEntity>(
            r#"
            SELECT g.id, g.name, g.description, g.owner_id, g.is_personal, g.created_at, gm.role
            FROM groups g
            JOIN group_members gm ON gm.group_id = g.id
            WHERE g.id = $1 AND gm.user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a non-personal group. Members, dishes and events cascade.
    pub async fn delete_group(&self, group_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_group");
        let result = sqlx::query(
            r#"
            DELETE FROM groups
            WHERE id = $1 AND NOT is_personal
            "#,
        )
        .bind(group_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Members of a group joined with their profiles, owner first.
    pub async fn list_members(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MemberWithProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_members");
        let result = sqlx::query_as::<_, MemberWithProfileEntity>(
            r#"
            SELECT gm.user_id, p.email, p.name, gm.role, gm.created_at AS joined_at
            FROM group_members gm
            JOIN profiles p ON p.id = gm.user_id
            WHERE gm.group_id = $1
            ORDER BY gm.role, LOWER(p.email)
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a member. A duplicate surfaces as a unique violation.
    pub async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRoleDb,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("add_group_member");
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Change a non-owner member's role. Returns false if no such member or
    /// the member is the owner.
    pub async fn update_member_role(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRoleDb,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_member_role");
        let result = sqlx::query(
            r#"
            UPDATE group_members SET role = $3
            WHERE group_id = $1 AND user_id = $2 AND role <> 'owner'
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Remove a non-owner member. Returns false if no such member or the
    /// member is the owner.
    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_group_member");
        let result = sqlx::query(
            r#"
            DELETE FROM group_members
            WHERE group_id = $1 AND user_id = $2 AND role <> 'owner'
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
