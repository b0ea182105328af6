//! Session cookie plumbing.
//!
//! Login stores a fresh token in the shared [`SessionCache`] and hands it to
//! the client as an HttpOnly cookie. The [`require_session`] middleware
//! guards endpoints that need a principal: it resolves the cookie back to an
//! account and injects it into request extensions for the handler.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::PoisonError;

use prs_core::constants::SESSION_COOKIE_NAME;
use prs_core::Account;

use crate::error::ApiError;
use crate::AppState;

/// The authenticated principal, injected by [`require_session`].
#[derive(Clone)]
pub struct CurrentAccount(pub Account);

/// Extracts the session token from the request's `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE_NAME).then(|| value.to_string())
    })
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value expiring the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Requires a valid session.
///
/// On success the resolved [`CurrentAccount`] is added to request extensions;
/// otherwise the request is answered with the authorization error directly.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_account(&state, req.headers()) {
        Ok(account) => {
            req.extensions_mut().insert(CurrentAccount(account));
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

fn resolve_account(state: &AppState, headers: &HeaderMap) -> Result<Account, ApiError> {
    let token = session_token(headers).ok_or(ApiError::Unauthorized)?;
    let account_id = state
        .sessions
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(&token)
        .ok_or(ApiError::Unauthorized)?;
    Ok(state.accounts.get(account_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).expect("valid header"));
        headers
    }

    #[test]
    fn test_token_parsed_from_cookie_header() {
        let headers = headers_with_cookie("sessionid=abc123");
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_found_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; sessionid=tok; lang=en");
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn test_no_cookie_header_yields_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_cookie_values_round_trip() {
        let set = session_cookie("tok");
        assert!(set.starts_with("sessionid=tok;"));
        assert!(set.contains("HttpOnly"));

        let clear = clear_session_cookie();
        assert!(clear.contains("Max-Age=0"));
    }
}
