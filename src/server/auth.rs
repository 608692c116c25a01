//! Bearer-token authentication.
//!
//! Protected routes run behind [`auth_middleware`], which resolves the token
//! to a user and stores an [`AuthUser`] in the request extensions. Handlers
//! pass `AuthUser::id` to every repository call as the owner.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;

/// Authenticated user info, added to request extensions after auth
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Auth error response
#[derive(Serialize)]
struct AuthError {
    error: &'static str,
    message: &'static str,
}

fn unauthorized(error: &'static str, message: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(AuthError { error, message })).into_response()
}

/// Extracts the token from an `Authorization` header value.
///
/// Accepts the `Bearer` and `Token` schemes.
fn parse_credentials(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token") {
        Some(token)
    } else {
        None
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Outer None: header absent. Inner None: header present but not ASCII.
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) => match h.and_then(parse_credentials) {
            Some(token) => token,
            None => {
                return unauthorized(
                    "invalid_auth",
                    "Authorization header must use Bearer scheme",
                )
            }
        },
        None => return unauthorized("missing_auth", "Authorization header required"),
    };

    match state.tokens().authenticate(token).await {
        Ok(Some(user)) => {
            tracing::debug!(user = %user.email, "Authenticated request");
            request.extensions_mut().insert(AuthUser {
                id: user.id,
                email: user.email,
            });
            next.run(request).await
        }
        Ok(None) => {
            tracing::warn!("Rejected request with unknown or inactive token");
            unauthorized("invalid_token", "Invalid token")
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
