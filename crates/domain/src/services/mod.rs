//! Domain services for Dinner Host.
//!
//! Services contain business logic that operates on domain models.

pub mod demand;
pub mod feedback_summary;
pub mod group_resolution;
pub mod guest_responses;
pub mod host_permission;

pub use demand::{aggregate_demand, DemandInput, DemandSummary, DishDemand, ShoppingItem};
pub use feedback_summary::{summarize_feedback, FeedbackSummary};
pub use group_resolution::{select_active, sort_groups};
pub use guest_responses::{
    record_feedback, record_selection, FeedbackSubmission, GuestResponseStore, RecorderError,
    SelectionSubmission,
};
pub use host_permission::HostPermissionPolicy;
