//! Coursegate Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, StoreConfig, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Coursegate web server
pub struct CoursegateServer {
    config: WebConfig,
    state: AppState,
}

impl CoursegateServer {
    /// Create a new server. The course store is not contacted until the
    /// first validation request.
    pub fn new(config: WebConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    /// Bind and serve until Ctrl+C or SIGTERM
    pub async fn start(self) -> WebResult<()> {
        let listener = TcpListener::bind(self.config.address())
            .await
            .map_err(WebError::Server)?;

        self.serve_on(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on(self, listener: TcpListener) -> WebResult<()> {
        let address = listener.local_addr().map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);
        if let Some(static_dir) = &self.config.static_dir {
            info!("Serving course pages from {}", static_dir);
        }

        let app = create_app(self.state);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for CoursegateServer
pub struct CoursegateServerBuilder {
    config: WebConfig,
}

impl CoursegateServerBuilder {
    /// Create a new server builder starting from defaults
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: WebConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set static files directory
    pub fn static_dir<S: Into<String>>(mut self, static_dir: S) -> Self {
        self.config.static_dir = Some(static_dir.into());
        self
    }

    /// Set the course store
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Build the server
    pub fn build(self) -> CoursegateServer {
        CoursegateServer::new(self.config)
    }
}

impl Default for CoursegateServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let server = CoursegateServerBuilder::new()
            .host("localhost")
            .port(3000)
            .dev_mode(true)
            .static_dir("site")
            .store(StoreConfig::with_url("sqlite::memory:"))
            .build();

        assert_eq!(server.config().host, "localhost");
        assert_eq!(server.config().port, 3000);
        assert!(server.config().dev_mode);
        assert_eq!(server.config().static_dir.as_deref(), Some("site"));
        assert!(server.state().store_configured());
    }

    #[test]
    fn test_config_defaults() {
        let config = WebConfig::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert!(!config.dev_mode);
        assert!(config.store.database_url.is_none());
    }
}
