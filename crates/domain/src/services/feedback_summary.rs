//! Host-facing rollup of guest feedback for one event.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Dish, DishFeedback, Event, EventFeedback, Guest, Rating};

/// Ratings of one dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DishFeedbackStats {
    pub dish_id: Uuid,
    pub name: String,
    pub ups: usize,
    pub downs: usize,
    pub total: usize,
}

/// One guest's feedback, dish by dish.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestFeedbackRow {
    pub guest_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub dish_feedback: Vec<DishFeedback>,
    pub event_comment: Option<String>,
}

/// Feedback table for an event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FeedbackSummary {
    pub total_guests: usize,
    pub responded_guests: usize,
    /// In menu order
    pub dishes: Vec<DishFeedbackStats>,
    /// Only guests who submitted feedback
    pub guests: Vec<GuestFeedbackRow>,
}

/// Builds the feedback table over rows loaded for one event.
pub fn summarize_feedback(
    event: &Event,
    dishes: &[Dish],
    guests: &[Guest],
    dish_feedback: &[DishFeedback],
    event_feedback: &[EventFeedback],
) -> FeedbackSummary {
    let by_id: HashMap<Uuid, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();

    let stats = event
        .all_dish_ids()
        .into_iter()
        .filter_map(|id| by_id.get(&id).copied())
        .map(|dish| {
            let rows = dish_feedback.iter().filter(|f| f.dish_id == dish.id);
            let (ups, downs) = rows.fold((0, 0), |(u, d), f| match f.rating {
                Rating::Up => (u + 1, d),
                Rating::Down => (u, d + 1),
            });
            DishFeedbackStats {
                dish_id: dish.id,
                name: dish.name.clone(),
                ups,
                downs,
                total: ups + downs,
            }
        })
        .collect();

    let responded: Vec<GuestFeedbackRow> = guests
        .iter()
        .filter(|g| g.has_submitted_feedback)
        .map(|g| GuestFeedbackRow {
            guest_id: g.id,
            email: g.email.clone(),
            name: g.name.clone(),
            dish_feedback: dish_feedback
                .iter()
                .filter(|f| f.guest_id == g.id)
                .cloned()
                .collect(),
            event_comment: event_feedback
                .iter()
                .find(|f| f.guest_id == g.id)
                .map(|f| f.comment.clone()),
        })
        .collect();

    FeedbackSummary {
        total_guests: guests.len(),
        responded_guests: responded.len(),
        dishes: stats,
        guests: responded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DishCategory, EventStatus, MainSelectionType};
    use chrono::{NaiveDate, Utc};

    fn dish(name: &str, category: DishCategory) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            group_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            category,
            ingredients: vec![],
            tags: vec![],
            recipe: None,
            image_url: None,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    fn guest(event_id: Uuid, submitted: bool) -> Guest {
        Guest {
            id: Uuid::new_v4(),
            event_id,
            email: format!("{}@example.com", Uuid::new_v4()),
            name: None,
            magic_token: String::new(),
            has_responded: true,
            has_submitted_feedback: submitted,
            created_at: Utc::now(),
        }
    }

    fn rate(guest: &Guest, dish: &Dish, rating: Rating) -> DishFeedback {
        DishFeedback {
            guest_id: guest.id,
            event_id: guest.event_id,
            dish_id: dish.id,
            rating,
            comment: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_feedback() {
        let soup = dish("Soup", DishCategory::Appetizer);
        let cake = dish("Cake", DishCategory::Dessert);
        let event = Event {
            id: Uuid::new_v4(),
            group_id: Uuid::nil(),
            title: "Supper".to_string(),
            description: None,
            event_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            status: EventStatus::Closed,
            appetizer_ids: vec![soup.id],
            main_dish_ids: vec![],
            dessert_ids: vec![cake.id],
            main_selection_type: MainSelectionType::ChooseOne,
            created_at: Utc::now(),
        };

        let g1 = guest(event.id, true);
        let g2 = guest(event.id, true);
        let g3 = guest(event.id, false);
        let ratings = vec![
            rate(&g1, &soup, Rating::Up),
            rate(&g2, &soup, Rating::Down),
            rate(&g1, &cake, Rating::Up),
        ];
        let comments = vec![EventFeedback {
            guest_id: g2.id,
            event_id: event.id,
            comment: "Lovely evening".to_string(),
            updated_at: Utc::now(),
        }];

        let summary = summarize_feedback(
            &event,
            &[cake.clone(), soup.clone()],
            &[g1.clone(), g2.clone(), g3],
            &ratings,
            &comments,
        );

        assert_eq!(summary.total_guests, 3);
        assert_eq!(summary.responded_guests, 2);
        assert_eq!(summary.dishes[0].name, "Soup");
        assert_eq!((summary.dishes[0].ups, summary.dishes[0].downs), (1, 1));
        assert_eq!((summary.dishes[1].ups, summary.dishes[1].total), (1, 1));

        let row2 = summary.guests.iter().find(|r| r.guest_id == g2.id).unwrap();
        assert_eq!(row2.event_comment.as_deref(), Some("Lovely evening"));
        let row1 = summary.guests.iter().find(|r| r.guest_id == g1.id).unwrap();
        assert_eq!(row1.dish_feedback.len(), 2);
    }
}
