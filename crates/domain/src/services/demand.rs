//! Demand aggregation for an event's order summary.
//!
//! Turns per-guest selections and dessert votes into per-dish serving counts,
//! a dessert winner and a consolidated shopping list. Pure and recomputed on
//! every read:
//! 1. Appetizers are served to every guest
//! 2. Mains are served to every guest (fixed menu) or per selection (choose one)
//! 3. Desserts are tallied by vote; only the winner is served, to every guest
//! 4. Ingredient demand is summed per exact ingredient string

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::models::{DessertVote, Dish, Event, MainSelectionType, Selection};

/// Input for demand aggregation, borrowed from rows already loaded for one request.
#[derive(Debug, Clone, Copy)]
pub struct DemandInput<'a> {
    pub event: &'a Event,
    /// Dishes referenced by the event. Extra dishes are ignored.
    pub dishes: &'a [Dish],
    pub selections: &'a [Selection],
    pub votes: &'a [DessertVote],
    pub guest_count: usize,
    pub responded_count: usize,
}

/// Serving count (or vote count, for desserts) of one dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DishDemand {
    pub dish_id: Uuid,
    pub name: String,
    pub count: usize,
}

/// One line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ShoppingItem {
    pub ingredient: String,
    pub quantity: usize,
}

/// Order summary for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DemandSummary {
    pub total_guests: usize,
    pub responded_guests: usize,
    pub main_selection_type: MainSelectionType,
    pub appetizers: Vec<DishDemand>,
    pub mains: Vec<DishDemand>,
    /// Vote counts, in the event's configured dessert order
    pub dessert_votes: Vec<DishDemand>,
    pub winning_dessert_id: Option<Uuid>,
    /// Sorted by ingredient
    pub shopping_list: Vec<ShoppingItem>,
}

#[cfg(test)]
impl DemandSummary {
    fn winning_dessert(&self) -> Option<&DishDemand> {
        let id = self.winning_dessert_id?;
        self.dessert_votes.iter().find(|d| d.dish_id == id)
    }
}

/// Resolves configured ids to loaded dishes, keeping configured order.
/// Ids with no loaded dish are skipped.
fn resolve<'a>(ids: &[Uuid], dishes: &HashMap<Uuid, &'a Dish>) -> Vec<&'a Dish> {
    ids.iter().filter_map(|id| dishes.get(id).copied()).collect()
}

fn count_where<T>(rows: &[T], pred: impl Fn(&T) -> bool) -> usize {
    rows.iter().filter(|r| pred(r)).count()
}

/// Highest count wins; on a tie the earlier entry is kept.
fn pick_winner(tally: &[DishDemand]) -> Option<Uuid> {
    let mut winner: Option<&DishDemand> = None;
    for entry in tally {
        match winner {
            Some(w) if entry.count <= w.count => {}
            _ => winner = Some(entry),
        }
    }
    winner.map(|w| w.dish_id)
}

/// Aggregate demand for an event.
pub fn aggregate_demand(input: DemandInput<'_>) -> DemandSummary {
    let event = input.event;
    let guests = input.guest_count;
    let dishes: HashMap<Uuid, &Dish> = input.dishes.iter().map(|d| (d.id, d)).collect();

    let appetizers = resolve(&event.appetizer_ids, &dishes);
    let mains = resolve(&event.main_dish_ids, &dishes);
    let desserts = resolve(&event.dessert_ids, &dishes);

    let demand = |dish: &Dish, count: usize| DishDemand {
        dish_id: dish.id,
        name: dish.name.clone(),
        count,
    };

    let appetizer_demand: Vec<DishDemand> =
        appetizers.iter().map(|&d| demand(d, guests)).collect();

    let main_demand: Vec<DishDemand> = mains
        .iter()
        .map(|&d| {
            let count = match event.main_selection_type {
                MainSelectionType::Fixed => guests,
                MainSelectionType::ChooseOne => {
                    count_where(input.selections, |s| s.selected_main_id == Some(d.id))
                }
            };
            demand(d, count)
        })
        .collect();

    let dessert_votes: Vec<DishDemand> = desserts
        .iter()
        .map(|&d| demand(d, count_where(input.votes, |v| v.dessert_id == d.id)))
        .collect();

    let winning_dessert_id = pick_winner(&dessert_votes);

    let mut totals: BTreeMap<String, usize> = BTreeMap::new();
    let mut add = |dish: &Dish, count: usize| {
        for ingredient in &dish.ingredients {
            *totals.entry(ingredient.clone()).or_insert(0) += count;
        }
    };

    for (&dish, d) in appetizers.iter().zip(&appetizer_demand) {
        add(dish, d.count);
    }
    for (&dish, d) in mains.iter().zip(&main_demand) {
        add(dish, d.count);
    }
    if let Some(&winner) = winning_dessert_id.and_then(|id| dishes.get(&id)) {
        add(winner, guests);
    }

    let shopping_list = totals
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .map(|(ingredient, quantity)| ShoppingItem {
            ingredient,
            quantity,
        })
        .collect();

    DemandSummary {
        total_guests: guests,
        responded_guests: input.responded_count,
        main_selection_type: event.main_selection_type,
        appetizers: appetizer_demand,
        mains: main_demand,
        dessert_votes,
        winning_dessert_id,
        shopping_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DishCategory, EventStatus};
    use chrono::{NaiveDate, Utc};

    fn dish(name: &str, category: DishCategory, ingredients: &[&str]) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            group_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            category,
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            tags: vec![],
            recipe: None,
            image_url: None,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    fn event(apps: &[&Dish], mains: &[&Dish], desserts: &[&Dish], kind: MainSelectionType) -> Event {
        Event {
            id: Uuid::new_v4(),
            group_id: Uuid::nil(),
            title: "Supper".to_string(),
            description: None,
            event_date: NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
            status: EventStatus::Active,
            appetizer_ids: apps.iter().map(|d| d.id).collect(),
            main_dish_ids: mains.iter().map(|d| d.id).collect(),
            dessert_ids: desserts.iter().map(|d| d.id).collect(),
            main_selection_type: kind,
            created_at: Utc::now(),
        }
    }

    fn selections(event: &Event, main: Option<Uuid>, n: usize) -> Vec<Selection> {
        (0..n)
            .map(|_| Selection {
                guest_id: Uuid::new_v4(),
                event_id: event.id,
                selected_main_id: main,
                updated_at: Utc::now(),
            })
            .collect()
    }

    fn votes(event: &Event, dessert: Uuid, n: usize) -> Vec<DessertVote> {
        (0..n)
            .map(|_| DessertVote {
                guest_id: Uuid::new_v4(),
                event_id: event.id,
                dessert_id: dessert,
                updated_at: Utc::now(),
            })
            .collect()
    }

    fn counts(list: &[DishDemand]) -> Vec<usize> {
        list.iter().map(|d| d.count).collect()
    }

    fn quantity(summary: &DemandSummary, ingredient: &str) -> Option<usize> {
        summary
            .shopping_list
            .iter()
            .find(|i| i.ingredient == ingredient)
            .map(|i| i.quantity)
    }

    #[test]
    fn test_ten_guest_scenario() {
        let a1 = dish("Bruschetta", DishCategory::Appetizer, &["bread", "tomato"]);
        let a2 = dish("Olives", DishCategory::Appetizer, &["olives"]);
        let m1 = dish("Risotto", DishCategory::Main, &["rice", "parmesan"]);
        let m2 = dish("Salmon", DishCategory::Main, &["salmon", "lemon"]);
        let m3 = dish("Lasagna", DishCategory::Main, &["pasta sheets"]);
        let d1 = dish("Tiramisu", DishCategory::Dessert, &["mascarpone"]);
        let d2 = dish("Sorbet", DishCategory::Dessert, &["lemon sorbet"]);
        let ev = event(&[&a1, &a2], &[&m1, &m2, &m3], &[&d1, &d2], MainSelectionType::ChooseOne);

        let mut sel = selections(&ev, Some(m1.id), 6);
        sel.extend(selections(&ev, Some(m2.id), 4));
        let mut vts = votes(&ev, d1.id, 7);
        vts.extend(votes(&ev, d2.id, 3));
        let dishes = vec![a1, a2, m1, m2, m3, d1.clone(), d2];

        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &dishes,
            selections: &sel,
            votes: &vts,
            guest_count: 10,
            responded_count: 10,
        });

        assert_eq!(counts(&summary.appetizers), vec![10, 10]);
        assert_eq!(counts(&summary.mains), vec![6, 4, 0]);
        assert_eq!(counts(&summary.dessert_votes), vec![7, 3]);
        assert_eq!(summary.winning_dessert_id, Some(d1.id));
        assert_eq!(summary.winning_dessert().unwrap().name, "Tiramisu");

        assert_eq!(quantity(&summary, "bread"), Some(10));
        assert_eq!(quantity(&summary, "rice"), Some(6));
        assert_eq!(quantity(&summary, "salmon"), Some(4));
        assert_eq!(quantity(&summary, "pasta sheets"), None);
        assert_eq!(quantity(&summary, "mascarpone"), Some(10));
        assert_eq!(quantity(&summary, "lemon sorbet"), None);
    }

    #[test]
    fn test_tie_goes_to_first_configured_dessert() {
        let d1 = dish("Flan", DishCategory::Dessert, &["eggs"]);
        let d2 = dish("Brownie", DishCategory::Dessert, &["cocoa"]);
        let ev = event(&[], &[], &[&d1, &d2], MainSelectionType::ChooseOne);

        // Insert D2's votes first so insertion order can't decide the tie.
        let mut vts = votes(&ev, d2.id, 5);
        vts.extend(votes(&ev, d1.id, 5));
        let dishes = vec![d2.clone(), d1.clone()];

        for _ in 0..5 {
            let summary = aggregate_demand(DemandInput {
                event: &ev,
                dishes: &dishes,
                selections: &[],
                votes: &vts,
                guest_count: 10,
                responded_count: 10,
            });
            assert_eq!(summary.winning_dessert_id, Some(d1.id));
            assert_eq!(quantity(&summary, "eggs"), Some(10));
            assert_eq!(quantity(&summary, "cocoa"), None);
        }
    }

    #[test]
    fn test_zero_guests() {
        let a = dish("Soup", DishCategory::Appetizer, &["stock"]);
        let m = dish("Steak", DishCategory::Main, &["beef"]);
        let d = dish("Pie", DishCategory::Dessert, &["apples"]);
        let ev = event(&[&a], &[&m], &[&d], MainSelectionType::Fixed);
        let dishes = vec![a, m, d];

        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &dishes,
            selections: &[],
            votes: &[],
            guest_count: 0,
            responded_count: 0,
        });

        assert_eq!(summary.total_guests, 0);
        assert_eq!(counts(&summary.appetizers), vec![0]);
        assert_eq!(counts(&summary.mains), vec![0]);
        assert_eq!(counts(&summary.dessert_votes), vec![0]);
        assert!(summary.shopping_list.is_empty());
    }

    #[test]
    fn test_zero_selections_choose_one() {
        let m1 = dish("Curry", DishCategory::Main, &["rice"]);
        let m2 = dish("Tacos", DishCategory::Main, &["tortillas"]);
        let ev = event(&[], &[&m1, &m2], &[], MainSelectionType::ChooseOne);
        let dishes = vec![m1, m2];

        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &dishes,
            selections: &[],
            votes: &[],
            guest_count: 8,
            responded_count: 0,
        });

        assert_eq!(counts(&summary.mains), vec![0, 0]);
        assert!(summary.shopping_list.is_empty());
        assert_eq!(summary.winning_dessert_id, None);
    }

    #[test]
    fn test_no_dishes_at_all() {
        let ev = event(&[], &[], &[], MainSelectionType::ChooseOne);
        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &[],
            selections: &[],
            votes: &[],
            guest_count: 4,
            responded_count: 2,
        });

        assert!(summary.appetizers.is_empty());
        assert!(summary.mains.is_empty());
        assert!(summary.dessert_votes.is_empty());
        assert_eq!(summary.winning_dessert_id, None);
        assert!(summary.winning_dessert().is_none());
        assert!(summary.shopping_list.is_empty());
        assert_eq!(summary.responded_guests, 2);
    }

    #[test]
    fn test_fixed_menu_serves_every_main_to_everyone() {
        let m1 = dish("Roast", DishCategory::Main, &["potatoes"]);
        let m2 = dish("Greens", DishCategory::Main, &["kale"]);
        let ev = event(&[], &[&m1, &m2], &[], MainSelectionType::Fixed);
        let sel = selections(&ev, None, 3);
        let dishes = vec![m1, m2];

        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &dishes,
            selections: &sel,
            votes: &[],
            guest_count: 5,
            responded_count: 3,
        });

        assert_eq!(counts(&summary.mains), vec![5, 5]);
        assert_eq!(quantity(&summary, "potatoes"), Some(5));
    }

    #[test]
    fn test_identical_ingredients_sum_and_sort() {
        let a = dish("Garlic bread", DishCategory::Appetizer, &["garlic", "butter"]);
        let m1 = dish("Aglio e olio", DishCategory::Main, &["garlic", "spaghetti"]);
        let m2 = dish("Scampi", DishCategory::Main, &["Garlic", "shrimp"]);
        let d = dish("Shortbread", DishCategory::Dessert, &["butter"]);
        let ev = event(&[&a], &[&m1, &m2], &[&d], MainSelectionType::ChooseOne);

        let mut sel = selections(&ev, Some(m1.id), 2);
        sel.extend(selections(&ev, Some(m2.id), 1));
        let dishes = vec![a, m1, m2, d];

        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &dishes,
            selections: &sel,
            votes: &[],
            guest_count: 3,
            responded_count: 3,
        });

        // Exact-string matching: "Garlic" and "garlic" stay separate.
        assert_eq!(quantity(&summary, "garlic"), Some(5));
        assert_eq!(quantity(&summary, "Garlic"), Some(1));
        // No votes: the first configured dessert still wins and is served.
        assert_eq!(quantity(&summary, "butter"), Some(6));

        let names: Vec<&str> = summary
            .shopping_list
            .iter()
            .map(|i| i.ingredient.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_unresolved_dish_ids_are_skipped() {
        let m = dish("Stew", DishCategory::Main, &["beef"]);
        let mut ev = event(&[], &[&m], &[], MainSelectionType::Fixed);
        ev.main_dish_ids.push(Uuid::new_v4());
        ev.dessert_ids.push(Uuid::new_v4());
        let dishes = vec![m];

        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &dishes,
            selections: &[],
            votes: &[],
            guest_count: 2,
            responded_count: 0,
        });

        assert_eq!(summary.mains.len(), 1);
        assert!(summary.dessert_votes.is_empty());
        assert_eq!(summary.winning_dessert_id, None);
    }

    #[test]
    fn test_votes_for_unlisted_dessert_are_ignored() {
        let d1 = dish("Cake", DishCategory::Dessert, &["flour"]);
        let d2 = dish("Pudding", DishCategory::Dessert, &["milk"]);
        let ev = event(&[], &[], &[&d1, &d2], MainSelectionType::ChooseOne);
        let mut vts = votes(&ev, Uuid::new_v4(), 9);
        vts.extend(votes(&ev, d2.id, 1));
        let dishes = vec![d1, d2.clone()];

        let summary = aggregate_demand(DemandInput {
            event: &ev,
            dishes: &dishes,
            selections: &[],
            votes: &vts,
            guest_count: 10,
            responded_count: 10,
        });

        assert_eq!(counts(&summary.dessert_votes), vec![0, 1]);
        assert_eq!(summary.winning_dessert_id, Some(d2.id));
    }
}
