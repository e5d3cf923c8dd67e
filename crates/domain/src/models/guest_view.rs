//! What a guest sees through their magic link.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::dish::{Dish, GuestDish};
use super::event::{Event, EventStatus, MainSelectionType};
use super::guest::Guest;
use super::response::{DishFeedback, EventFeedback};

/// Event details safe to show a guest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestEventInfo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub status: EventStatus,
    pub main_selection_type: MainSelectionType,
}

impl From<&Event> for GuestEventInfo {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            event_date: event.event_date,
            status: event.status,
            main_selection_type: event.main_selection_type,
        }
    }
}

/// The guest's own identity, as shown back to them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestSelf {
    pub id: Uuid,
    pub name: Option<String>,
    pub has_responded: bool,
    pub has_submitted_feedback: bool,
}

impl From<&Guest> for GuestSelf {
    fn from(guest: &Guest) -> Self {
        Self {
            id: guest.id,
            name: guest.name.clone(),
            has_responded: guest.has_responded,
            has_submitted_feedback: guest.has_submitted_feedback,
        }
    }
}

/// Dishes of one event grouped by course, in the event's configured order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestMenu {
    pub appetizers: Vec<GuestDish>,
    pub mains: Vec<GuestDish>,
    pub desserts: Vec<GuestDish>,
}

impl GuestMenu {
    /// Orders `dishes` by the event's course lists. Ids that do not resolve
    /// (for example a dish deleted after the event was composed) are skipped.
    pub fn arrange(event: &Event, dishes: &[Dish]) -> Self {
        let pick = |ids: &[Uuid]| -> Vec<GuestDish> {
            ids.iter()
                .filter_map(|id| dishes.iter().find(|d| d.id == *id))
                .cloned()
                .map(GuestDish::from)
                .collect()
        };

        Self {
            appetizers: pick(&event.appetizer_ids),
            mains: pick(&event.main_dish_ids),
            desserts: pick(&event.dessert_ids),
        }
    }
}

/// Response for the guest menu page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestMenuView {
    pub event: GuestEventInfo,
    pub guest: GuestSelf,
    pub menu: GuestMenu,
    pub selected_main_id: Option<Uuid>,
    pub selected_dessert_id: Option<Uuid>,
}

/// Response for the guest feedback page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestFeedbackView {
    pub event: GuestEventInfo,
    pub guest: GuestSelf,
    pub menu: GuestMenu,
    pub dish_feedback: Vec<DishFeedback>,
    pub event_feedback: Option<EventFeedback>,
}
