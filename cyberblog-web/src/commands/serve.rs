//! Serve command - run the web site

use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use cyberblog_web::{serve, AppState};

use super::get_context;
use crate::output;

pub fn run(data_dir: &Path, bind: Option<String>) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let bind = bind.unwrap_or_else(|| ctx.config.bind.clone());

    let purged = ctx.session_service.purge_expired()?;
    if purged > 0 {
        info!(purged, "removed expired sessions");
    }

    if ctx.config.flaws.broken_access_control || ctx.config.flaws.sql_injection {
        output::warning("Intentional vulnerabilities are enabled. Do not expose this server.");
    }

    let state = AppState::new(ctx)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let listener = TcpListener::bind(&bind)
            .await
            .with_context(|| format!("Failed to bind {}", bind))?;
        serve(state, listener).await
    })
}
