use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::cookies;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::backend::models::User;
use crate::backend::BackendError;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Body of `GET /api/auth/me`, shaped `{success, user}` or `{success, error}`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(MeResponse {
                success: false,
                user: None,
                error: Some(BackendError::Unauthorized.to_string()),
            }),
        )
            .into_response()
    };

    let Some(token) = cookies::auth_token(&headers) else {
        return unauthorized();
    };

    match state.backend.me(&token).await {
        Ok(user) => Json(MeResponse {
            success: true,
            user: Some(user),
            error: None,
        })
        .into_response(),
        Err(BackendError::Unauthorized) => unauthorized(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let token = state.backend.login(req.email.trim(), &req.password).await?;
    let user = state.backend.me(&token).await?;
    let cookie = cookies::session_cookie(&token, state.config.server.secure_cookies)?;

    tracing::info!(user_id = %user.id, "User signed in");

    let mut response = JSend::success(LoginResponse { user }).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout() -> Response {
    let mut response = JSend::success(()).into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, cookies::expired_cookie());
    response
}
