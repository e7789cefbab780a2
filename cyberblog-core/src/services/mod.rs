//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and the repository. Each service
//! focuses on one area of the site.

mod account;
mod lookup;
pub mod migration;
pub mod password;
mod profile;
mod session;
mod status;
mod thought;

pub use account::AccountService;
pub use lookup::LookupService;
pub use migration::{MigrationResult, MigrationService};
pub use profile::{ProfileService, AVATAR_DIR};
pub use session::SessionService;
pub use status::{StatusService, StatusSummary};
pub use thought::ThoughtService;
