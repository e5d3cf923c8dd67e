//! Dish repository for database operations.

use domain::models::dish::{CreateDishRequest, UpdateDishRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{DishCategoryDb, DishEntity};
use crate::metrics::QueryTimer;

const DISH_COLUMNS: &str = "d.id, d.group_id, d.name, d.description, d.category, d.ingredients, \
     d.tags, d.recipe, d.image_url, d.deleted_at, d.created_at";

/// Repository for the dish library.
///
/// Host-facing methods take the caller's user id and only touch dishes in
/// groups the caller belongs to.
#[derive(Clone)]
pub struct DishRepository {
    pool: PgPool,
}

impl DishRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Live (non-deleted) dishes of a group, by category then name.
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<DishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_dishes");
        let result = sqlx::query_as::<_, DishEntity>(&format!(
            r#"
            SELECT {DISH_COLUMNS}
            FROM dishes d
            JOIN group_members gm ON gm.group_id = d.group_id AND gm.user_id = $2
            WHERE d.group_id = $1 AND d.deleted_at IS NULL
            ORDER BY d.category, LOWER(d.name)
            "#
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A live dish, only if the user belongs to its group.
    pub async fn find_for_user(
        &self,
        dish_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<DishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_dish_for_user");
        let result = sqlx::query_as::<_, DishEntity>(&format!(
            r#"
            SELECT {DISH_COLUMNS}
            FROM dishes d
            JOIN group_members gm ON gm.group_id = d.group_id AND gm.user_id = $2
            WHERE d.id = $1 AND d.deleted_at IS NULL
            "#
        ))
        .bind(dish_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Dishes of one group by id, soft-deleted ones included so an event's
    /// existing menu still renders.
    pub async fn find_in_group(
        &self,
        group_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<DishEntity>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("find_dishes_in_group");
        let result = sqlx::query_as::<_, DishEntity>(&format!(
            r#"
            SELECT {DISH_COLUMNS}
            FROM dishes d
            WHERE d.group_id = $1 AND d.id = ANY($2)
            "#
        ))
        .bind(group_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a dish in a group the user belongs to. `None` if not a member.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateDishRequest,
    ) -> Result<Option<DishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_dish");
        let result = sqlx::query_as::<_, DishEntity>(&format!(
            r#"
            WITH member AS (
                SELECT group_id FROM group_members WHERE group_id = $1 AND user_id = $2
            )
            INSERT INTO dishes AS d (group_id, name, description, category, ingredients, tags, recipe, image_url)
            SELECT member.group_id, $3, $4, $5, $6, $7, $8, $9 FROM member
            RETURNING {DISH_COLUMNS}
            "#
        ))
        .bind(request.group_id)
        .bind(user_id)
        .bind(request.name.trim())
        .bind(request.description.as_deref())
        .bind(DishCategoryDb::from(request.category))
        .bind(&request.ingredients)
        .bind(&request.tags)
        .bind(request.recipe.as_deref())
        .bind(request.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Edit a live dish. Absent fields keep their value. `None` if the dish
    /// does not exist, is deleted, or the user is not a member of its group.
    pub async fn update(
        &self,
        dish_id: Uuid,
        user_id: Uuid,
        request: &UpdateDishRequest,
    ) -> Result<Option<DishEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_dish");
        let result = sqlx::query_as::<_, DishEntity>(&format!(
            r#"
            UPDATE dishes AS d SET
                name = COALESCE($3, d.name),
                description = COALESCE($4, d.description),
                category = COALESCE($5, d.category),
                ingredients = COALESCE($6, d.ingredients),
                tags = COALESCE($7, d.tags),
                recipe = COALESCE($8, d.recipe),
                image_url = COALESCE($9, d.image_url)
            FROM group_members gm
            WHERE d.id = $1
              AND d.deleted_at IS NULL
              AND gm.group_id = d.group_id
              AND gm.user_id = $2
            RETURNING {DISH_COLUMNS}
            "#
        ))
        .bind(dish_id)
        .bind(user_id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.description.as_deref())
        .bind(request.category.map(DishCategoryDb::from))
        .bind(request.ingredients.as_deref())
        .bind(request.tags.as_deref())
        .bind(request.recipe.as_deref())
        .bind(request.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether any event lists the dish in one of its courses.
    pub async fn is_on_event_menu(&self, dish_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("dish_on_event_menu");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM events
                WHERE $1 = ANY(appetizer_ids)
                   OR $1 = ANY(main_dish_ids)
                   OR $1 = ANY(dessert_ids)
            )
            "#,
        )
        .bind(dish_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Soft-delete a dish. Returns false if nothing was deleted.
    pub async fn soft_delete(&self, dish_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("soft_delete_dish");
        let result = sqlx::query(
            r#"
            UPDATE dishes AS d SET deleted_at = NOW()
            FROM group_members gm
            WHERE d.id = $1
              AND d.deleted_at IS NULL
              AND gm.group_id = d.group_id
              AND gm.user_id = $2
            "#,
        )
        .bind(dish_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
