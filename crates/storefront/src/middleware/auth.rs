//! Identity extractors.
//!
//! Both extractors read the `cafego_session` cookie and resolve it through
//! the session registry. A missing, unknown or expired token is an anonymous
//! caller, not an error; a storage failure is.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::Span;

use crate::error::AppError;
use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::models::{Identity, User};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// Anonymous callers are rejected with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalAuth(identity) = OptionalAuth::from_request_parts(parts, state).await?;
        identity
            .into_user()
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Please log in first.".to_string()))
    }
}

/// Extractor that resolves the caller's identity without rejecting anonymous
/// callers.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalAuth(identity): OptionalAuth,
/// ) -> impl IntoResponse {
///     match identity.user() {
///         Some(u) => format!("Hello, {}!", u.username),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Identity);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
            return Ok(Self(Identity::Anonymous));
        };

        let identity = state.sessions().resolve(cookie.value()).await?;
        if let Some(user) = identity.user() {
            Span::current().record("user_id", user.id.as_i64());
        }

        Ok(Self(identity))
    }
}
