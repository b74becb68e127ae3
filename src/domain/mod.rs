pub mod user;
pub mod club;
pub mod announcement;
pub mod proposal;
pub mod event;
pub mod application;

pub use user::*;
pub use club::*;
pub use announcement::*;
pub use proposal::*;
pub use event::*;
pub use application::*;

use uuid::Uuid;

/// Anything stored in a collection and addressed by id.
pub trait Identified {
    fn id(&self) -> Uuid;
}
