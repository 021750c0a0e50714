//! Coursegate Web Server
//!
//! Serves the course code validation endpoint and, optionally, the course
//! pages it protects.

use clap::Parser;
use coursegate_core::{init_logging, LogFormat, LoggingConfig};
use coursegate_web::{config_validator::validate_config, server::CoursegateServerBuilder, WebConfig};
use tracing::{error, info};

/// Coursegate Web Server - course code validation for static course pages
#[derive(Parser)]
#[command(name = "coursegate-web")]
#[command(about = "Course code validation endpoint")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Directory of course pages to serve
    #[arg(long)]
    static_dir: Option<String>,

    /// SQLite URL of the course store
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (compact, pretty, json)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let logging = LoggingConfig {
        level: args.log_level.clone(),
        format: args.log_format,
        filter_directives: vec![
            format!("coursegate_web={}", args.log_level),
            "tower_http=debug".to_string(),
        ],
        ..LoggingConfig::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    // Environment first, command line on top
    let mut config = WebConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.dev_mode |= args.dev;
    if args.static_dir.is_some() {
        config.static_dir = args.static_dir;
    }
    if args.database_url.is_some() {
        config.store.database_url = args.database_url;
    }

    if let Err(e) = validate_config(&config) {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Starting Coursegate Web Server on http://{}", config.address());

    let server = CoursegateServerBuilder::from_config(config).build();
    if let Err(e) = server.start().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["coursegate-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.dev);
        assert_eq!(args.log_format, LogFormat::Compact);

        let args = Args::parse_from([
            "coursegate-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--database-url",
            "sqlite://courses.db",
            "--log-format",
            "json",
        ]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(3000));
        assert!(args.dev);
        assert_eq!(args.database_url.as_deref(), Some("sqlite://courses.db"));
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
