//! Spotify sign-in, sign-out and profile

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::db::sessions;
use crate::error::ApiError;
use crate::services::AuthError;
use crate::AppState;

use super::session::{load_from_cookie, removal_cookie, require_listener, session_cookie};

/// 302 Found to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// GET /login
pub async fn login(State(state): State<AppState>) -> Result<Response, ApiError> {
    let url = state
        .auth()
        .authorize_url()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(found(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /callback
///
/// Every outcome redirects back to the app; failures carry an `error` query
/// parameter the browser script turns into a message.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Response), ApiError> {
    if let Some(reason) = query.error {
        warn!("Spotify authorization denied: {}", reason);
        return Ok((jar, found("/?error=auth_failed")));
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Ok((jar, found("/?error=no_code")));
    };

    let tokens = match state.auth().exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(AuthError::Timeout) => {
            error!("Token exchange timed out");
            return Ok((jar, found("/?error=timeout")));
        }
        Err(e) => {
            error!("Token exchange failed: {}", e);
            return Ok((jar, found("/?error=spotify_api")));
        }
    };

    // Logging in again replaces any previous session
    if let Some(previous) = load_from_cookie(&state, &jar).await? {
        sessions::delete_session(&state.db, &previous.session_id).await?;
    }

    let session = sessions::create_session(&state.db, &tokens).await?;
    info!("Listener logged in");

    Ok((jar.add(session_cookie(session.session_id)), found("/")))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(session) = load_from_cookie(&state, &jar).await? {
        sessions::delete_session(&state.db, &session.session_id).await?;
    }

    Ok((
        jar.remove(removal_cookie()),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// GET /me
pub async fn current_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<UserResponse>, ApiError> {
    let listener = match require_listener(&state, &jar).await {
        Err(ApiError::Unauthorized(_)) => {
            return Err(ApiError::Unauthorized("User not authenticated".to_string()))
        }
        other => other?,
    };

    let user = state.catalog(&listener.access_token).current_user().await?;

    Ok(Json(UserResponse {
        id: user.id,
        name: user.display_name,
        email: user.email,
        image: user.images.into_iter().next().map(|i| i.url),
    }))
}
