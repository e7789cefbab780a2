//! Request handlers, one module per page

pub mod accounts;
pub mod lookup;
pub mod user_page;

use std::sync::Arc;

use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

use cyberblog_core::{BlogContext, Flash, User};

use crate::error::AppResult;
use crate::server::AppState;

/// The signed-in user as templates see it
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Notices queued on the session, consumed by this render
pub fn take_messages(state: &AppState, token: Option<&str>) -> AppResult<Vec<Flash>> {
    match token {
        Some(token) => Ok(state.ctx.session_service.take_flash(token)?),
        None => Ok(Vec::new()),
    }
}

/// 303 redirect that also sets (or clears) the session cookie
pub fn redirect_with_cookie(location: &str, cookie: String) -> Response {
    ([(header::SET_COOKIE, cookie)], Redirect::to(location)).into_response()
}

/// Run password hashing and other slow core calls on the blocking pool
pub async fn blocking<T, F>(state: &AppState, work: F) -> AppResult<T>
where
    F: FnOnce(&BlogContext) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let ctx = Arc::clone(&state.ctx);
    let output = tokio::task::spawn_blocking(move || work(&ctx)).await??;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberblog_core::config::Config;
    use tempfile::TempDir;

    #[tokio::test(flavor = "current_thread")]
    async fn test_blocking_runs_off_the_request_thread() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = BlogContext::with_config(Config::with_defaults(temp_dir.path())).unwrap();
        let state = AppState::new(ctx).unwrap();

        let caller = std::thread::current().id();
        let (worker, users) = blocking(&state, |ctx| {
            Ok((std::thread::current().id(), ctx.repository.count_users()?))
        })
        .await
        .unwrap();

        assert_ne!(worker, caller);
        assert_eq!(users, 0);
    }

    #[tokio::test]
    async fn test_blocking_propagates_errors() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = BlogContext::with_config(Config::with_defaults(temp_dir.path())).unwrap();
        let state = AppState::new(ctx).unwrap();

        let result: AppResult<()> = blocking(&state, |_| anyhow::bail!("boom")).await;
        assert!(result.is_err());
    }
}
