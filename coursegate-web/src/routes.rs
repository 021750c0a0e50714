//! Route definitions for the Coursegate web server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

/// Create API routes, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Course code validation; other methods get a JSON 405
        .route(
            "/validate-code",
            post(handlers::validate_code).fallback(handlers::method_not_allowed),
        )
        // API description
        .route("/openapi.json", get(openapi::openapi_json))
}

/// Serve the course pages from `static_dir`
pub fn static_pages(static_dir: &str) -> ServeDir {
    ServeDir::new(static_dir).append_index_html_on_directories(true)
}
