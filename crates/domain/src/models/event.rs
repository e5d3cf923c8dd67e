//! Dinner event models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::dish::{Dish, DishCategory};

/// Lifecycle of an event. Transitions are host-controlled and reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Active,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Active => "active",
            EventStatus::Closed => "closed",
        }
    }

    /// Whether guests may still change their menu selection.
    pub fn accepts_selections(&self) -> bool {
        !matches!(self, EventStatus::Closed)
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(EventStatus::Draft),
            "active" => Ok(EventStatus::Active),
            "closed" => Ok(EventStatus::Closed),
            _ => Err(format!("Invalid event status: {}", s)),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether each guest picks one main, or everyone gets every main.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainSelectionType {
    ChooseOne,
    Fixed,
}

impl MainSelectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainSelectionType::ChooseOne => "choose_one",
            MainSelectionType::Fixed => "fixed",
        }
    }
}

/// A dinner event composed from a group's dishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub status: EventStatus,
    pub appetizer_ids: Vec<Uuid>,
    pub main_dish_ids: Vec<Uuid>,
    pub dessert_ids: Vec<Uuid>,
    pub main_selection_type: MainSelectionType,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// All dish ids on the menu, in course order.
    pub fn all_dish_ids(&self) -> Vec<Uuid> {
        self.appetizer_ids
            .iter()
            .chain(&self.main_dish_ids)
            .chain(&self.dessert_ids)
            .copied()
            .collect()
    }

    pub fn has_dish(&self, dish_id: Uuid) -> bool {
        self.appetizer_ids.contains(&dish_id)
            || self.main_dish_ids.contains(&dish_id)
            || self.dessert_ids.contains(&dish_id)
    }
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateEventRequest {
    pub group_id: Uuid,

    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub event_date: NaiveDate,

    #[serde(default)]
    pub appetizer_ids: Vec<Uuid>,

    #[serde(default)]
    pub main_dish_ids: Vec<Uuid>,

    #[serde(default)]
    pub dessert_ids: Vec<Uuid>,

    #[serde(default = "default_main_selection_type")]
    pub main_selection_type: MainSelectionType,
}

fn default_main_selection_type() -> MainSelectionType {
    MainSelectionType::ChooseOne
}

/// Request payload for moving an event between statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventStatusRequest {
    pub status: EventStatus,
}

/// Why a proposed menu was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("Dish {0} is not in this group's library")]
    UnknownDish(Uuid),

    #[error("Dish {dish_id} is a {actual}, not a {expected}")]
    WrongCategory {
        dish_id: Uuid,
        expected: DishCategory,
        actual: DishCategory,
    },

    #[error("Dish {0} is listed more than once")]
    Duplicate(Uuid),
}

impl CreateEventRequest {
    /// Checks every referenced dish against the group's live (non-deleted)
    /// library: it must exist there, sit in the matching course, and appear
    /// only once on the menu.
    pub fn check_menu(&self, library: &[Dish]) -> Result<(), MenuError> {
        let mut seen = std::collections::HashSet::new();
        let courses = [
            (&self.appetizer_ids, DishCategory::Appetizer),
            (&self.main_dish_ids, DishCategory::Main),
            (&self.dessert_ids, DishCategory::Dessert),
        ];

        for (ids, expected) in courses {
            for &dish_id in ids {
                if !seen.insert(dish_id) {
                    return Err(MenuError::Duplicate(dish_id));
                }
                let dish = library
                    .iter()
                    .find(|d| d.id == dish_id && d.group_id == self.group_id && !d.is_deleted())
                    .ok_or(MenuError::UnknownDish(dish_id))?;
                if dish.category != expected {
                    return Err(MenuError::WrongCategory {
                        dish_id,
                        expected,
                        actual: dish.category,
                    });
                }
            }
        }

        Ok(())
    }
}
