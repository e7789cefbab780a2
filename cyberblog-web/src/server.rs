//! HTTP server for the cyberblog site.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use cyberblog_core::BlogContext;

use crate::handlers::{accounts, lookup, user_page};
use crate::templates::Templates;

/// Room for multipart framing and the other form fields around an avatar
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<BlogContext>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(ctx: BlogContext) -> Result<Self> {
        Ok(Self {
            ctx: Arc::new(ctx),
            templates: Arc::new(Templates::new()?),
        })
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    let media_dir = state.ctx.config.media_dir();
    let body_limit = state.ctx.config.max_avatar_bytes + BODY_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(|| async { Redirect::to(user_page::PATH) }))
        .route(
            "/register/",
            get(accounts::register_page).post(accounts::register_submit),
        )
        .route(
            "/login/",
            get(accounts::login_page).post(accounts::login_submit),
        )
        .route("/logout/", get(accounts::logout).post(accounts::logout))
        .route(user_page::PATH, get(user_page::show).post(user_page::submit))
        .route("/flaw_sql_injection/", get(lookup::flaw_sql_injection))
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(state: AppState, listener: TcpListener) -> Result<()> {
    let flaws = state.ctx.config.flaws;
    info!(
        addr = %listener.local_addr()?,
        broken_access_control = flaws.broken_access_control,
        sql_injection = flaws.sql_injection,
        "cyberblog listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // An error here means no signal handler could be installed; run until killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
