//! Session extraction from request parts.
//!
//! Resolves the session cookie to the acting `(user, shop)` pair. This is the
//! single entry point through which handlers learn who is acting; a request
//! without a valid session is rejected with `Unauthenticated` before any
//! domain logic runs.

use crate::{
    AppState,
    api::models::users::CurrentSession,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::trace;

/// Extract the session from the session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(session)): Valid session token found and verified
/// - Some(Err(error)): Cookie header present but unreadable
fn try_session_cookie(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentSession>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(current) => return Some(Ok(current)),
                    Err(_) => {
                        // Invalid/expired token; expected for stale cookies, keep scanning
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_session_cookie(parts, &state.config) {
            Some(Ok(current)) => {
                trace!("Found session for user {}", current.username);
                Ok(current)
            }
            Some(Err(e)) => Err(e),
            None => {
                trace!("No session credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}
