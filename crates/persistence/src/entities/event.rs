//! Event entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{EventStatus, MainSelectionType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for event_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatusDb {
    Draft,
    Active,
    Closed,
}

impl From<EventStatusDb> for EventStatus {
    fn from(db: EventStatusDb) -> Self {
        match db {
            EventStatusDb::Draft => EventStatus::Draft,
            EventStatusDb::Active => EventStatus::Active,
            EventStatusDb::Closed => EventStatus::Closed,
        }
    }
}

impl From<EventStatus> for EventStatusDb {
    fn from(status: EventStatus) -> Self {
        match status {
            EventStatus::Draft => EventStatusDb::Draft,
            EventStatus::Active => EventStatusDb::Active,
            EventStatus::Closed => EventStatusDb::Closed,
        }
    }
}

/// Database enum for main_selection_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "main_selection_type", rename_all = "snake_case")]
pub enum MainSelectionTypeDb {
    ChooseOne,
    Fixed,
}

impl From<MainSelectionTypeDb> for MainSelectionType {
    fn from(db: MainSelectionTypeDb) -> Self {
        match db {
            MainSelectionTypeDb::ChooseOne => MainSelectionType::ChooseOne,
            MainSelectionTypeDb::Fixed => MainSelectionType::Fixed,
        }
    }
}

impl From<MainSelectionType> for MainSelectionTypeDb {
    fn from(kind: MainSelectionType) -> Self {
        match kind {
            MainSelectionType::ChooseOne => MainSelectionTypeDb::ChooseOne,
            MainSelectionType::Fixed => MainSelectionTypeDb::Fixed,
        }
    }
}

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub status: EventStatusDb,
    pub appetizer_ids: Vec<Uuid>,
    pub main_dish_ids: Vec<Uuid>,
    pub dessert_ids: Vec<Uuid>,
    pub main_selection_type: MainSelectionTypeDb,
    pub created_at: DateTime<Utc>,
}

impl From<EventEntity> for domain::models::Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            title: entity.title,
            description: entity.description,
            event_date: entity.event_date,
            status: entity.status.into(),
            appetizer_ids: entity.appetizer_ids,
            main_dish_ids: entity.main_dish_ids,
            dessert_ids: entity.dessert_ids,
            main_selection_type: entity.main_selection_type.into(),
            created_at: entity.created_at,
        }
    }
}
