//! Repository implementations for database operations.

pub mod dish;
pub mod event;
pub mod group;
pub mod guest;
pub mod profile;
pub mod response;

pub use dish::DishRepository;
pub use event::EventRepository;
pub use group::GroupRepository;
pub use guest::GuestRepository;
pub use profile::ProfileRepository;
pub use response::GuestResponseRepository;
