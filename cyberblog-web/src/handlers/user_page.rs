//! Profile page: avatar, thought composer and thought list
//!
//! Whose page is shown comes from [`ProfileService::resolve_target`], so the
//! `user_id` query parameter is honoured or ignored depending on the
//! broken-access-control switch. Posted thoughts always belong to the
//! caller.
//!
//! [`ProfileService::resolve_target`]: cyberblog_core::services::ProfileService::resolve_target

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cyberblog_core::domain::forms::{ProfileUpdateForm, ThoughtForm};
use cyberblog_core::{Flash, FormErrors, Profile, Submission, Thought, User};

use super::{take_messages, UserView};
use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::server::AppState;
use crate::submission::FormData;

pub const PATH: &str = "/user_page/";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProfileView {
    image_url: String,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            image_url: format!("/media/{}", profile.image),
        }
    }
}

#[derive(Debug, Serialize)]
struct ThoughtView {
    id: i64,
    text: String,
    created_at: String,
}

impl From<&Thought> for ThoughtView {
    fn from(thought: &Thought) -> Self {
        Self {
            id: thought.id,
            text: thought.text.clone(),
            created_at: thought.created_at.format("%b %-d, %Y, %H:%M").to_string(),
        }
    }
}

/// Bound forms carried into a re-render after a failed POST
#[derive(Debug, Default)]
struct PageForms {
    picture_errors: FormErrors,
    thought_form: ThoughtForm,
    thought_errors: FormErrors,
}

pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let (target, profile) = state
        .ctx
        .profile_service
        .resolve_target(&current.user, query.user_id.as_deref())?;
    render_page(&state, &current, &target, &profile, PageForms::default())
}

pub async fn submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<PageQuery>,
    mut data: FormData,
) -> AppResult<Response> {
    let (target, profile) = state
        .ctx
        .profile_service
        .resolve_target(&current.user, query.user_id.as_deref())?;
    let mut forms = PageForms::default();

    if data.has("update_picture") {
        let form = ProfileUpdateForm::new(data.take_file("image"));
        match state.ctx.profile_service.update_picture(&profile, &form)? {
            Submission::Accepted(_) => {
                return notify_and_return(
                    &state,
                    &current,
                    "Your profile picture has been updated!",
                );
            }
            Submission::Rejected(errors) => forms.picture_errors = errors,
        }
    } else if data.has("post_thought") {
        let form = ThoughtForm::from_fields(&data.fields);
        match state.ctx.thought_service.post(&current.user, &form)? {
            Submission::Accepted(_) => {
                return notify_and_return(&state, &current, "Your thought has been shared!");
            }
            Submission::Rejected(errors) => {
                forms.thought_errors = errors;
                forms.thought_form = form;
            }
        }
    } else {
        debug!("profile page post without an action marker");
    }

    render_page(&state, &current, &target, &profile, forms)
}

fn notify_and_return(state: &AppState, current: &CurrentUser, message: &str) -> AppResult<Response> {
    state
        .ctx
        .session_service
        .push_flash(&current.token, Flash::success(message))?;
    Ok(Redirect::to(PATH).into_response())
}

fn render_page(
    state: &AppState,
    current: &CurrentUser,
    target: &User,
    profile: &Profile,
    forms: PageForms,
) -> AppResult<Response> {
    let thoughts: Vec<ThoughtView> = state
        .ctx
        .thought_service
        .list_for_page(&current.user, target)?
        .iter()
        .map(ThoughtView::from)
        .collect();
    let messages = take_messages(state, Some(&current.token))?;

    let page = state.templates.render(
        "user_page.html",
        context! {
            user => UserView::from(&current.user),
            target_user => UserView::from(target),
            profile => ProfileView::from(profile),
            thoughts,
            picture_errors => forms.picture_errors,
            thought_form => forms.thought_form,
            thought_errors => forms.thought_errors,
            messages,
        },
    )?;
    Ok(page.into_response())
}
