pub mod announcements;
pub mod applications;
pub mod auth;
pub mod changes;
pub mod clubs;
pub mod events;
pub mod proposals;
pub mod root;
