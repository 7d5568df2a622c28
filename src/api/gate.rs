use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::cookies;

fn is_dashboard(path: &str) -> bool {
    path == "/dashboard" || path.starts_with("/dashboard/")
}

/// Keep signed-out users off the dashboard and signed-in users off the login page.
/// Only the cookie's presence is checked; the backend validates it on use.
pub async fn route_gate(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let signed_in = cookies::auth_token(req.headers()).is_some();

    if is_dashboard(path) && !signed_in {
        tracing::debug!(path, "Redirecting signed-out request to login");
        return Redirect::temporary("/login").into_response();
    }

    if path == "/login" && signed_in {
        return Redirect::temporary("/dashboard").into_response();
    }

    next.run(req).await
}
