//! Dish library models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_ingredients, validate_not_blank, validate_tags};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Course a dish is served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DishCategory {
    Appetizer,
    Main,
    Dessert,
}

impl DishCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DishCategory::Appetizer => "appetizer",
            DishCategory::Main => "main",
            DishCategory::Dessert => "dessert",
        }
    }
}

impl FromStr for DishCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "appetizer" => Ok(DishCategory::Appetizer),
            "main" => Ok(DishCategory::Main),
            "dessert" => Ok(DishCategory::Dessert),
            _ => Err(format!("Invalid dish category: {}", s)),
        }
    }
}

impl fmt::Display for DishCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dish in a group's library. `recipe` is host-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Dish {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: DishCategory,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub recipe: Option<String>,
    pub image_url: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Dish {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Guest-facing view of a dish. Has no recipe field at all, so it cannot
/// leak through serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestDish {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: DishCategory,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

impl From<Dish> for GuestDish {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            description: dish.description,
            category: dish.category,
            ingredients: dish.ingredients,
            tags: dish.tags,
            image_url: dish.image_url,
        }
    }
}

/// Request payload for creating a dish.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateDishRequest {
    pub group_id: Uuid,

    #[validate(
        length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub category: DishCategory,

    #[serde(default)]
    #[validate(custom(function = "validate_ingredients"))]
    pub ingredients: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,

    #[validate(length(max = 20000, message = "Recipe must be at most 20000 characters"))]
    pub recipe: Option<String>,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

/// Request payload for editing a dish. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateDishRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub category: Option<DishCategory>,

    #[validate(custom(function = "validate_ingredients"))]
    pub ingredients: Option<Vec<String>>,

    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,

    #[validate(length(max = 20000, message = "Recipe must be at most 20000 characters"))]
    pub recipe: Option<String>,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}
