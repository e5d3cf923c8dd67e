//! Domain layer for the Dinner Host backend.
//!
//! This crate contains:
//! - Domain models (Group, Dish, Event, Guest, responses)
//! - Business logic services (demand aggregation, recorders, permission gate)

pub mod models;
pub mod services;
