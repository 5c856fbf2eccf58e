pub mod auth;
pub mod dashboard;
pub mod export;
pub mod forms;
pub mod public;
pub mod session;

use crate::state::SharedState;
use axum::{http::HeaderMap, routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

/// Client IP as reported by the reverse proxy, "unknown" when absent.
pub(crate) fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router(state.clone()))
        .nest("/dashboard", dashboard::router(state.clone()))
        .nest("/forms", forms::router(state.clone()))
        .nest("/f", public::router(state))
}
