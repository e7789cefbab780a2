//! CLI command implementations

pub mod delete_user;
pub mod flaws;
pub mod serve;
pub mod status;
pub mod users;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cyberblog_core::BlogContext;

/// `--data-dir` / `CYBERBLOG_DIR`, else `~/.cyberblog`
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => Ok(dirs::home_dir()
            .context("Could not find home directory")?
            .join(".cyberblog")),
    }
}

/// Create the data directory if needed and open the context
pub fn get_context(data_dir: &Path) -> Result<BlogContext> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    BlogContext::new(data_dir).context("Failed to initialize cyberblog context")
}
