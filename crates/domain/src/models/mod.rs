//! Domain models for Dinner Host.

pub mod dish;
pub mod dish_import;
pub mod event;
pub mod group;
pub mod guest;
pub mod guest_view;
pub mod profile;
pub mod response;

pub use dish::{Dish, DishCategory, GuestDish};
pub use event::{Event, EventStatus, MainSelectionType};
pub use group::{Group, GroupMember, GroupRole, GroupWithRole};
pub use guest::{Guest, GuestLinks};
pub use profile::Profile;
pub use response::{DessertVote, DishFeedback, EventFeedback, Rating, Selection};
