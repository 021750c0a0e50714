//! Coursegate Web Server
//!
//! Validation endpoint gating static course pages behind a course code, and
//! optionally the static pages themselves.

pub mod config_validator;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

// Re-export main types
pub use server::CoursegateServer;
pub use state::AppState;
pub use store::StoreConfig;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let mut router = Router::new().nest("/api", routes::api_routes());

    if let Some(static_dir) = &state.config.static_dir {
        router = router.fallback_service(routes::static_pages(static_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Directory of course pages to serve next to the API
    pub static_dir: Option<String>,
    /// Course store settings
    pub store: StoreConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            static_dir: None,
            store: StoreConfig::default(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("COURSEGATE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("COURSEGATE_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            dev_mode: std::env::var("COURSEGATE_DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            static_dir: std::env::var("COURSEGATE_STATIC_DIR").ok(),
            store: StoreConfig::from_env(),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
