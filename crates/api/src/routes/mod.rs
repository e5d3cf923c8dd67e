//! HTTP route handlers.

pub mod auth;
pub mod dishes;
pub mod events;
pub mod groups;
pub mod guest_portal;
pub mod guests;
pub mod health;
pub mod me;
