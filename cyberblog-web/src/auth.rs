//! Session cookie handling and the signed-in user extractor

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Uri};
use axum::response::{IntoResponse, Redirect, Response};

use cyberblog_core::User;

use crate::error::AppResult;
use crate::server::AppState;

pub const SESSION_COOKIE: &str = "sessionid";
pub const LOGIN_PATH: &str = "/login/";

/// Session token from the `Cookie` header(s), if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Resolve the request's session to a user, if it has a live one
pub fn optional_session(
    state: &AppState,
    headers: &HeaderMap,
) -> AppResult<Option<(String, User)>> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };
    Ok(state
        .ctx
        .session_service
        .resolve(&token)?
        .map(|user| (token, user)))
}

/// `next` values are honoured only when they stay on this site
pub fn is_local_path(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}

/// `/login/?next=<path>` for the current request
pub fn login_redirect(uri: &Uri) -> Redirect {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    Redirect::to(&format!("{}?{}", LOGIN_PATH, query))
}

/// The signed-in caller. Anonymous requests are sent to the login page.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match optional_session(state, &parts.headers) {
            Ok(Some((token, user))) => Ok(CurrentUser { user, token }),
            Ok(None) => Err(login_redirect(&parts.uri).into_response()),
            Err(err) => Err(err.into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sessionid=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_or_empty_session_cookie() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid="));
        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn test_local_paths() {
        assert!(is_local_path("/user_page/?user_id=2"));
        assert!(!is_local_path("//evil.example/"));
        assert!(!is_local_path("https://evil.example/"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path(""));
    }

    #[test]
    fn test_login_redirect_encodes_next() {
        let uri: Uri = "/user_page/?user_id=2".parse().unwrap();
        let response = login_redirect(&uri).into_response();
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, "/login/?next=%2Fuser_page%2F%3Fuser_id%3D2");
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", 60);
        assert!(cookie.starts_with("sessionid=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(expired_session_cookie().contains("Max-Age=0"));
    }
}
