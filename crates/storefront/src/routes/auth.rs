//! Login and logout handlers.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{SESSION_COOKIE_NAME, session_cookie, session_removal_cookie};
use crate::state::AppState;

/// Shown when a username/password pair does not match.
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid login. Please go back and try again.";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Check credentials and start a session.
///
/// On success the session cookie is set and the client is sent home.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Some(user) = state
        .credentials()
        .authenticate(&form.username, &form.password)
        .await?
    else {
        tracing::warn!(username = %form.username, "rejected login");
        return Ok((StatusCode::UNAUTHORIZED, INVALID_LOGIN_MESSAGE).into_response());
    };

    let token = state.sessions().create_session(&user).await?;
    set_sentry_user(&user.id, user.username.as_str());
    tracing::info!(user_id = %user.id, "user logged in");

    let jar = jar.add(session_cookie(&token, state.config().secure_cookies()));
    Ok((jar, Redirect::to("/")).into_response())
}

/// End the caller's session, if any, and clear the cookie.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        let ended = state.sessions().end_session(cookie.value()).await?;
        tracing::info!(ended, "user logged out");
    }
    clear_sentry_user();

    let jar = jar.remove(session_removal_cookie());
    Ok((jar, Redirect::to("/")).into_response())
}
