//! Dish entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::DishCategory;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for dish_category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "dish_category", rename_all = "lowercase")]
pub enum DishCategoryDb {
    Appetizer,
    Main,
    Dessert,
}

impl From<DishCategoryDb> for DishCategory {
    fn from(db: DishCategoryDb) -> Self {
        match db {
            DishCategoryDb::Appetizer => DishCategory::Appetizer,
            DishCategoryDb::Main => DishCategory::Main,
            DishCategoryDb::Dessert => DishCategory::Dessert,
        }
    }
}

impl From<DishCategory> for DishCategoryDb {
    fn from(category: DishCategory) -> Self {
        match category {
            DishCategory::Appetizer => DishCategoryDb::Appetizer,
            DishCategory::Main => DishCategoryDb::Main,
            DishCategory::Dessert => DishCategoryDb::Dessert,
        }
    }
}

/// Database row mapping for the dishes table.
#[derive(Debug, Clone, FromRow)]
pub struct DishEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: DishCategoryDb,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub recipe: Option<String>,
    pub image_url: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<DishEntity> for domain::models::Dish {
    fn from(entity: DishEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            name: entity.name,
            description: entity.description,
            category: entity.category.into(),
            ingredients: entity.ingredients,
            tags: entity.tags,
            recipe: entity.recipe,
            image_url: entity.image_url,
            deleted_at: entity.deleted_at,
            created_at: entity.created_at,
        }
    }
}
