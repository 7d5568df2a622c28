use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{gate, handlers};
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.server.max_upload_size as usize;

    Router::new()
        // Auth
        .route("/api/auth/me", get(handlers::me))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        // Projects
        .route("/api/projects", get(handlers::list_projects))
        .route("/api/projects/:id/documents", get(handlers::list_documents))
        .route(
            "/api/projects/:id/uploads",
            post(handlers::create_uploads).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Pages
        .route("/dashboard", get(handlers::dashboard))
        .route("/dashboard/*section", get(handlers::dashboard_section))
        .route("/login", get(handlers::login_page))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(middleware::from_fn(gate::route_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
