//! cyberblog core - logic for a deliberately vulnerable teaching blog
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: entities (User, Profile, Thought, Session) and form validation
//! - **ports**: trait definitions for external dependencies (MediaStore)
//! - **services**: use cases (registration, sessions, profile page, lookup)
//! - **adapters**: concrete implementations (DuckDB, local filesystem)
//!
//! The intentional vulnerabilities are selected per flaw through
//! [`config::FlawSwitches`]; every flawed code path has a corrected twin.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbRepository;
use adapters::media::FsMediaStore;
use config::Config;
use domain::{DEFAULT_AVATAR, DEFAULT_AVATAR_BYTES};
use ports::MediaStore;
use services::*;

// Re-export commonly used types at crate root
pub use adapters::duckdb::QueryResult;
pub use config::FlawSwitches;
pub use domain::result::Error;
pub use domain::{Flash, FlashLevel, FormErrors, Profile, Submission, Thought, User};

/// Main context for cyberblog operations
///
/// Holds the database connection, configuration and all services. The web
/// front end and the CLI both build one of these.
pub struct BlogContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub media: Arc<dyn MediaStore>,
    pub account_service: AccountService,
    pub session_service: SessionService,
    pub profile_service: ProfileService,
    pub thought_service: ThoughtService,
    pub lookup_service: LookupService,
    pub status_service: StatusService,
}

impl BlogContext {
    /// Load settings from `data_dir` and open its database
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Self::with_config(config)
    }

    /// Open the database described by an already-built config
    pub fn with_config(config: Config) -> Result<Self> {
        std::fs::create_dir_all(config.media_dir()).with_context(|| {
            format!("Failed to create media directory: {:?}", config.media_dir())
        })?;

        let repository = Arc::new(DuckDbRepository::new(&config.db_path())?);
        repository.ensure_schema()?;

        let media: Arc<dyn MediaStore> = Arc::new(FsMediaStore::new(config.media_dir()));
        if !media.exists(DEFAULT_AVATAR) {
            media
                .save(DEFAULT_AVATAR, DEFAULT_AVATAR_BYTES)
                .context("Failed to write the default avatar")?;
        }

        let account_service = AccountService::new(Arc::clone(&repository));
        let session_service =
            SessionService::new(Arc::clone(&repository), config.session_ttl_hours);
        let profile_service = ProfileService::new(
            Arc::clone(&repository),
            Arc::clone(&media),
            config.flaws,
            config.max_avatar_bytes,
        );
        let thought_service = ThoughtService::new(Arc::clone(&repository), config.flaws);
        let lookup_service = LookupService::new(Arc::clone(&repository), config.flaws);
        let status_service = StatusService::new(Arc::clone(&repository), config.flaws);

        Ok(Self {
            config,
            repository,
            media,
            account_service,
            session_service,
            profile_service,
            thought_service,
            lookup_service,
            status_service,
        })
    }
}
