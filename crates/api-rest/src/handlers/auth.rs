//! Authentication endpoints: login, logout, register, profile.

use api_shared::wire::{AuthRes, LoginReq, RegisterReq};
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::PoisonError;

use prs_core::{dashboard_destination, NewAccount};

use crate::error::ApiError;
use crate::session::{self, CurrentAccount};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session established", body = AuthRes),
        (status = 401, description = "Bad credentials", body = AuthRes)
    )
)]
/// Log in
///
/// Checks the credentials, establishes a session and sets the session
/// cookie. The success body carries the public user projection and the
/// dashboard path for the account's role. The failure body is identical for
/// an unknown username and a wrong password.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Response, ApiError> {
    let account = state.accounts.authenticate(&req.username, &req.password)?;

    let token = state
        .sessions
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .start(account.id);

    tracing::info!("session opened for {}", account.username);

    let body = AuthRes::login(
        account.to_public(),
        dashboard_destination(account.role.as_str()),
    );
    let mut response = Json(body).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&session::session_cookie(&token))
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/logout/",
    responses(
        (status = 200, description = "Session ended", body = AuthRes)
    )
)]
/// Log out
///
/// Drops the caller's session, if any, and expires the session cookie.
/// Succeeds even without an established session.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(token) = session::session_token(&headers) {
        state
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .end(&token);
    }

    let mut response = Json(AuthRes::ok()).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&session::clear_session_cookie())
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created", body = AuthRes),
        (status = 400, description = "Username taken or invalid input", body = AuthRes)
    )
)]
/// Register an account
///
/// Creates a login account; the role defaults to `patient`. A taken username
/// is rejected without creating anything.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> Result<(StatusCode, Json<AuthRes>), ApiError> {
    let account = state.accounts.register(NewAccount {
        username: req.username,
        password: req.password,
        email: req.email,
        role: req.role,
        first_name: None,
        last_name: None,
    })?;

    tracing::info!("account registered: {}", account.username);

    Ok((StatusCode::CREATED, Json(AuthRes::user(account.to_public()))))
}

#[utoipa::path(
    get,
    path = "/profile/",
    responses(
        (status = 200, description = "Caller's public projection", body = AuthRes),
        (status = 401, description = "No authenticated session", body = AuthRes)
    )
)]
/// Current user's profile
///
/// Requires an authenticated session; returns the caller's own public
/// projection.
#[axum::debug_handler]
pub async fn profile(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Json<AuthRes> {
    Json(AuthRes::user(account.to_public()))
}
