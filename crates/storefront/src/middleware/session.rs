//! Session cookie configuration.
//!
//! The cookie carries only the opaque token; everything else lives in the
//! `sessions` table and is resolved by `SessionRegistry`.

use axum_extra::extract::cookie::{Cookie, SameSite};

use cafego_core::SessionToken;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cafego_session";

/// Cookie that hands a freshly issued token to the client.
///
/// `secure` should be true when the storefront is served over HTTPS.
#[must_use]
pub fn session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie matching [`session_cookie`]'s path, for removal on logout.
#[must_use]
pub fn session_removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}
