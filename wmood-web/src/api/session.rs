//! Session cookie handling and token refresh
//!
//! The browser holds only an opaque session id in an HTTP-only cookie; the
//! Spotify tokens stay in the session table.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::db::{sessions, Session};
use crate::error::ApiError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "wmood_session";

/// A logged-in listener for the current request
#[derive(Debug, Clone)]
pub struct Listener {
    pub access_token: String,
}

pub fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(24))
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Session referenced by the request cookie, if it is still live
pub async fn load_from_cookie(state: &AppState, jar: &CookieJar) -> Result<Option<Session>, ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    Ok(sessions::load_session(&state.db, cookie.value()).await?)
}

/// The listener, or 401 when there is no session with an access token
pub async fn require_listener(state: &AppState, jar: &CookieJar) -> Result<Listener, ApiError> {
    let session = load_from_cookie(state, jar)
        .await?
        .ok_or_else(ApiError::not_logged_in)?;

    match session.access_token {
        Some(access_token) => Ok(Listener { access_token }),
        None => Err(ApiError::not_logged_in()),
    }
}

/// Refresh the access token when it is about to expire
///
/// Never rejects the request itself: a failed refresh clears the tokens and
/// the handler then answers 401.
pub async fn refresh_token_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = refresh_if_needed(&state, &jar).await {
        warn!("Token refresh check failed: {}", e);
    }

    next.run(request).await
}

async fn refresh_if_needed(state: &AppState, jar: &CookieJar) -> Result<(), ApiError> {
    let Some(session) = load_from_cookie(state, jar).await? else {
        return Ok(());
    };
    let Some(tokens) = session.tokens() else {
        return Ok(());
    };
    let Some(refresh_token) = tokens.refresh_token.as_deref() else {
        return Ok(());
    };

    if !tokens.needs_refresh(Utc::now().timestamp_millis()) {
        return Ok(());
    }

    debug!(session_id = %session.session_id, "Access token near expiry");

    match state.auth().refresh(refresh_token).await {
        Ok(refreshed) => {
            sessions::update_tokens(&state.db, &session.session_id, &refreshed).await?;
            info!("Token refreshed successfully");
        }
        Err(e) => {
            warn!("Token refresh failed: {}", e);
            sessions::clear_tokens(&state.db, &session.session_id).await?;
        }
    }

    Ok(())
}
