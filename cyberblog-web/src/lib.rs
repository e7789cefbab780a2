//! cyberblog web - the HTTP front end
//!
//! Routes:
//! - `/register/`, `/login/`, `/logout/`: accounts and sessions
//! - `/user_page/`: profile picture, thought composer and thought list
//! - `/flaw_sql_injection/`: thought lookup by id
//! - `/media/*`: uploaded files
//!
//! The handlers are thin: validation and data access live in
//! `cyberblog-core`, and each intentional flaw is chosen there by
//! [`cyberblog_core::FlawSwitches`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod submission;
pub mod templates;

pub use error::{AppError, AppResult};
pub use server::{build_router, serve, AppState};
