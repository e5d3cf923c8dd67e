//! Bulk loading of a group's dish library from exported recipe notes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::dish::{CreateDishRequest, DishCategory};

/// Maximum dishes per import request.
pub const MAX_IMPORT_DISHES: usize = 200;

/// Request to import dishes into one group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct DishImportRequest {
    #[validate(length(min = 1, max = 200, message = "dishes must contain 1-200 items"))]
    pub dishes: Vec<ImportedDish>,
}

/// One dish as found in a recipe export. Only `name` is required; every
/// other field is normalized on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ImportedDish {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Preparation steps, in order.
    #[serde(default)]
    pub process: Vec<String>,
    pub notes: Option<String>,
    /// Free-form course label such as "starter" or "sweet".
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Remote URL or a path local to the export.
    pub image: Option<String>,
}

/// Maps a free-form course label onto a dish category. Anything unknown,
/// including a missing label, is a main course.
pub fn normalize_category(label: Option<&str>) -> DishCategory {
    match label.map(|l| l.trim().to_lowercase()).as_deref() {
        Some("appetizer") | Some("starter") => DishCategory::Appetizer,
        Some("dessert") | Some("sweet") => DishCategory::Dessert,
        _ => DishCategory::Main,
    }
}

/// Numbers the steps ("1. ...") separated by blank lines. Blank steps are
/// dropped before numbering.
pub fn assemble_recipe(process: &[String]) -> Option<String> {
    let steps: Vec<String> = process
        .iter()
        .map(|step| step.trim())
        .filter(|step| !step.is_empty())
        .enumerate()
        .map(|(idx, step)| format!("{}. {}", idx + 1, step))
        .collect();

    if steps.is_empty() {
        None
    } else {
        Some(steps.join("\n\n"))
    }
}

fn is_remote_image(image: &str) -> bool {
    image.starts_with("http://") || image.starts_with("https://")
}

impl ImportedDish {
    /// Only remote images can be referenced; local paths are dropped.
    pub fn image_url(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|image| is_remote_image(image))
    }

    /// The create request this dish becomes. Notes turn into the
    /// description and the steps into the recipe.
    pub fn to_create_request(&self, group_id: Uuid) -> CreateDishRequest {
        CreateDishRequest {
            group_id,
            name: self.name.trim().to_string(),
            description: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            category: normalize_category(self.category.as_deref()),
            ingredients: self.ingredients.clone(),
            tags: self.tags.clone(),
            recipe: assemble_recipe(&self.process),
            image_url: self.image_url().map(str::to_string),
        }
    }
}

/// Dishes created per course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ImportedByCategory {
    pub appetizer: u32,
    pub main: u32,
    pub dessert: u32,
}

impl ImportedByCategory {
    pub fn add(&mut self, category: DishCategory) {
        match category {
            DishCategory::Appetizer => self.appetizer += 1,
            DishCategory::Main => self.main += 1,
            DishCategory::Dessert => self.dessert += 1,
        }
    }
}

/// Response from a dish import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DishImportResponse {
    pub processed: u32,
    pub created: u32,
    pub by_category: ImportedByCategory,
    /// Rows whose image was a local path and was left off.
    pub images_skipped: u32,
    pub errors: Vec<DishImportError>,
}

/// A row that was not imported.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DishImportError {
    /// 1-indexed position in the request.
    pub row: usize,
    pub name: String,
    pub error: String,
}
