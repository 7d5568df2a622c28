use axum::extract::FromRequestParts;
use axum::http::header::{HeaderMap, HeaderValue, COOKIE};
use axum::http::request::Parts;

use crate::api::response::ApiError;
use crate::backend::models::AuthToken;

pub const AUTH_COOKIE: &str = "AuthToken";
const MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Read the auth token from the request's cookies.
pub fn auth_token(headers: &HeaderMap) -> Option<AuthToken> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == AUTH_COOKIE && !value.is_empty())
        .map(|(_, value)| AuthToken(value.to_string()))
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn session_cookie(token: &AuthToken, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{AUTH_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={MAX_AGE_SECS}",
        token.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|_| ApiError::internal("Backend issued a token that is not cookie-safe"))
}

/// `Set-Cookie` value that expires the session cookie.
pub fn expired_cookie() -> HeaderValue {
    HeaderValue::from_static("AuthToken=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Extractor for the caller's auth token. Rejects with 401 when the cookie is absent.
pub struct RequireAuth(pub AuthToken);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
        auth_token(&parts.headers)
            .map(RequireAuth)
            .ok_or_else(ApiError::unauthorized)
    }
}
