//! Thought lookup by id, open to anonymous visitors

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use minijinja::context;
use serde::Deserialize;

use super::{take_messages, UserView};
use crate::auth::optional_session;
use crate::error::AppResult;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    id: Option<String>,
}

/// With the SQL-injection switch on, `id` is pasted into the query text.
/// Malformed SQL surfaces as a 500.
pub async fn flaw_sql_injection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LookupQuery>,
) -> AppResult<Response> {
    let session = optional_session(&state, &headers)?;
    let result = state.ctx.lookup_service.lookup(query.id.as_deref())?;

    let (columns, rows) = match &result {
        Some(found) => (found.columns.clone(), found.rows.clone()),
        None => (Vec::new(), Vec::new()),
    };
    let messages = take_messages(&state, session.as_ref().map(|(token, _)| token.as_str()))?;

    let page = state.templates.render(
        "thought.html",
        context! {
            user => session.as_ref().map(|(_, user)| UserView::from(user)),
            searched => result.is_some(),
            id => query.id.unwrap_or_default(),
            columns,
            rows,
            messages,
        },
    )?;
    Ok(page.into_response())
}
