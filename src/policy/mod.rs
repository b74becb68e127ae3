//! Role-based visibility and permission rules.
//!
//! Everything here is pure: functions take a user and an entity and return a
//! decision without touching the store.

pub mod permissions;
pub mod visibility;

pub use permissions::{can_perform, ensure, Action, AnnouncementScope, EntityKind, RoleCapabilities, Target};
pub use visibility::{filter_visible, is_visible, Audience, Visible};
