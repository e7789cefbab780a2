//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod forms;
mod profile;
pub mod result;
mod session;
mod thought;
mod user;

pub use forms::{FormErrors, Submission};
pub use profile::{Profile, DEFAULT_AVATAR, DEFAULT_AVATAR_BYTES};
pub use session::{Flash, FlashLevel, Session};
pub use thought::{Thought, MAX_THOUGHT_LENGTH};
pub use user::{NewUser, User};
