//! Registration, login and logout

use std::collections::HashMap;

use axum::extract::{Form, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use minijinja::context;
use serde::Deserialize;
use tracing::info;

use cyberblog_core::domain::forms::{LoginForm, RegistrationForm};
use cyberblog_core::{Flash, FormErrors, Submission};

use super::{blocking, redirect_with_cookie, user_page};
use crate::auth::{
    expired_session_cookie, is_local_path, optional_session, session_cookie, session_token,
    LOGIN_PATH,
};
use crate::error::AppResult;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

fn session_max_age(state: &AppState) -> i64 {
    state.ctx.config.session_ttl_hours * 3600
}

// ============================================================================
// Registration
// ============================================================================

pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if optional_session(&state, &headers)?.is_some() {
        return Ok(Redirect::to(user_page::PATH).into_response());
    }
    render_register(&state, &RegistrationForm::default(), &FormErrors::new())
}

pub async fn register_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if optional_session(&state, &headers)?.is_some() {
        return Ok(Redirect::to(user_page::PATH).into_response());
    }

    let form = RegistrationForm::from_fields(&fields);
    let (form, outcome) = blocking(&state, move |ctx| {
        let outcome = ctx.account_service.register(&form)?;
        Ok((form, outcome))
    })
    .await?;
    match outcome {
        Submission::Accepted(user) => {
            let sessions = &state.ctx.session_service;
            let token = sessions.create(user.id)?;
            sessions.push_flash(&token, Flash::success("Registration successful."))?;
            Ok(redirect_with_cookie(
                user_page::PATH,
                session_cookie(&token, session_max_age(&state)),
            ))
        }
        Submission::Rejected(errors) => render_register(&state, &form, &errors),
    }
}

fn render_register(
    state: &AppState,
    form: &RegistrationForm,
    errors: &FormErrors,
) -> AppResult<Response> {
    let page = state
        .templates
        .render("register.html", context! { form, errors })?;
    Ok(page.into_response())
}

// ============================================================================
// Login / logout
// ============================================================================

pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> AppResult<Response> {
    let next = query.next.unwrap_or_default();
    render_login(&state, &LoginForm::default(), &FormErrors::new(), &next)
}

pub async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NextQuery>,
    Form(fields): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let next = fields
        .get("next")
        .filter(|next| !next.is_empty())
        .cloned()
        .or(query.next)
        .unwrap_or_default();

    let form = LoginForm::from_fields(&fields);
    let (form, outcome) = blocking(&state, move |ctx| {
        let outcome = ctx.account_service.authenticate(&form)?;
        Ok((form, outcome))
    })
    .await?;
    match outcome {
        Submission::Accepted(user) => {
            let sessions = &state.ctx.session_service;
            if let Some(previous) = session_token(&headers) {
                sessions.destroy(&previous)?;
            }
            let token = sessions.create(user.id)?;
            info!(user_id = user.id, "logged in");

            let target = if is_local_path(&next) {
                next.as_str()
            } else {
                user_page::PATH
            };
            Ok(redirect_with_cookie(
                target,
                session_cookie(&token, session_max_age(&state)),
            ))
        }
        Submission::Rejected(errors) => render_login(&state, &form, &errors, &next),
    }
}

fn render_login(
    state: &AppState,
    form: &LoginForm,
    errors: &FormErrors,
    next: &str,
) -> AppResult<Response> {
    let page = state
        .templates
        .render("login.html", context! { form, errors, next })?;
    Ok(page.into_response())
}

/// End the session (if any) and return to the login page
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = session_token(&headers) {
        state.ctx.session_service.destroy(&token)?;
    }
    Ok(redirect_with_cookie(LOGIN_PATH, expired_session_cookie()))
}
