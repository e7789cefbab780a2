//! HTTP error mapping
//!
//! Every data-layer failure becomes a bare 500 page. The cause goes to the
//! log, never to the browser.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

const SERVER_ERROR_PAGE: &str = "<!doctype html>\n<title>Server Error (500)</title>\n<h1>Server Error (500)</h1>\n";

/// Handler error wrapping any `anyhow`-compatible failure
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = ?self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_error_becomes_500() {
        let err = AppError::from(anyhow::anyhow!("Database error: disk on fire"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
