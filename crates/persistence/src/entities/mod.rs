//! Entity definitions (database row mappings).

pub mod dish;
pub mod event;
pub mod group;
pub mod guest;
pub mod profile;
pub mod response;

pub use dish::{DishCategoryDb, DishEntity};
pub use event::{EventEntity, EventStatusDb, MainSelectionTypeDb};
pub use group::{GroupEntity, GroupRoleDb, GroupWithRoleEntity, MemberWithProfileEntity};
pub use guest::GuestEntity;
pub use profile::ProfileEntity;
pub use response::{
    DessertVoteEntity, DishFeedbackEntity, EventFeedbackEntity, RatingDb, SelectionEntity,
};
