//! Configuration validation for the Coursegate web server
//!
//! Checks the server configuration before start-up. A missing course store
//! is reported but does not stop the server: validation requests then fail
//! with a 500 until the store is configured.

use crate::{store::is_identifier, WebConfig, WebError, WebResult};
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, path::Path};
use tracing::{error, info, warn};

/// Configuration validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub recommendations: Vec<String>,
}

/// Configuration validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub severity: ErrorSeverity,
}

/// Configuration validation warning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub recommendation: String,
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete web configuration
    pub fn validate_config(config: &WebConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut recommendations = Vec::new();

        Self::validate_network_config(config, &mut errors, &mut warnings);
        Self::validate_store_config(config, &mut errors, &mut warnings);
        Self::validate_static_config(config, &mut errors, &mut warnings);
        Self::validate_dev_mode_config(config, &mut warnings, &mut recommendations);

        if config.host == "0.0.0.0" {
            recommendations.push(
                "Consider a reverse proxy terminating TLS when binding to 0.0.0.0".to_string(),
            );
        }

        let is_valid = errors
            .iter()
            .all(|e| !matches!(e.severity, ErrorSeverity::Critical));

        ValidationResult {
            is_valid,
            errors,
            warnings,
            recommendations,
        }
    }

    fn validate_network_config(
        config: &WebConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if config.host.is_empty() {
            errors.push(ValidationError {
                field: "host".to_string(),
                message: "Host cannot be empty".to_string(),
                severity: ErrorSeverity::Critical,
            });
        } else if config.host.parse::<IpAddr>().is_err() && config.host != "localhost" {
            errors.push(ValidationError {
                field: "host".to_string(),
                message: format!("Invalid host format: {}", config.host),
                severity: ErrorSeverity::High,
            });
        }

        if config.port == 0 {
            errors.push(ValidationError {
                field: "port".to_string(),
                message: "Port cannot be 0".to_string(),
                severity: ErrorSeverity::Critical,
            });
        } else if config.port < 1024 && !config.dev_mode {
            warnings.push(ValidationWarning {
                field: "port".to_string(),
                message: format!("Using privileged port {} in production", config.port),
                recommendation: "Consider using a port >= 1024 behind a reverse proxy"
                    .to_string(),
            });
        }
    }

    fn validate_store_config(
        config: &WebConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let store = &config.store;

        match store.database_url.as_deref() {
            None => errors.push(ValidationError {
                field: "database_url".to_string(),
                message: "COURSEGATE_DATABASE_URL is not set; every validation will fail"
                    .to_string(),
                severity: ErrorSeverity::High,
            }),
            Some(url) if url.contains(":memory:") && !config.dev_mode => {
                warnings.push(ValidationWarning {
                    field: "database_url".to_string(),
                    message: "In-memory course store holds no course records".to_string(),
                    recommendation: "Point COURSEGATE_DATABASE_URL at a database file".to_string(),
                });
            }
            Some(url) => {
                let path = url
                    .strip_prefix("sqlite://")
                    .or_else(|| url.strip_prefix("sqlite:"))
                    .unwrap_or(url);
                let path = path.split('?').next().unwrap_or(path);
                if !path.contains(":memory:") && !Path::new(path).exists() {
                    errors.push(ValidationError {
                        field: "database_url".to_string(),
                        message: format!("Database file does not exist: {}", path),
                        severity: ErrorSeverity::High,
                    });
                }
            }
        }

        for (field, value) in [
            ("database", &store.database),
            ("collection", &store.collection),
            ("code_field", &store.code_field),
            ("redirect_field", &store.redirect_field),
        ] {
            if !is_identifier(value) {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!("'{}' is not a valid SQL identifier", value),
                    severity: ErrorSeverity::High,
                });
            }
        }
    }

    fn validate_static_config(
        config: &WebConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let Some(static_dir) = &config.static_dir else {
            return;
        };

        let path = Path::new(static_dir);
        if static_dir.is_empty() {
            errors.push(ValidationError {
                field: "static_dir".to_string(),
                message: "Static directory cannot be empty if provided".to_string(),
                severity: ErrorSeverity::Medium,
            });
        } else if !path.is_dir() {
            errors.push(ValidationError {
                field: "static_dir".to_string(),
                message: format!("Static directory does not exist: {}", static_dir),
                severity: ErrorSeverity::Medium,
            });
        } else if !path.join("index.html").exists() {
            warnings.push(ValidationWarning {
                field: "static_dir".to_string(),
                message: "No index.html found in static directory".to_string(),
                recommendation: "Courses without a redirect target land on /index.html"
                    .to_string(),
            });
        }
    }

    fn validate_dev_mode_config(
        config: &WebConfig,
        warnings: &mut Vec<ValidationWarning>,
        recommendations: &mut Vec<String>,
    ) {
        if config.dev_mode {
            warnings.push(ValidationWarning {
                field: "dev_mode".to_string(),
                message: "Development mode is enabled".to_string(),
                recommendation: "Disable development mode for production deployment".to_string(),
            });
            recommendations.push("Ensure dev_mode is set to false for production".to_string());
        }
    }

    /// Log validation results
    pub fn log_validation_results(result: &ValidationResult) {
        if result.is_valid {
            info!("Configuration validation passed");
        } else {
            error!("Configuration validation failed");
        }

        for e in &result.errors {
            match e.severity {
                ErrorSeverity::Critical | ErrorSeverity::High => {
                    error!(field = %e.field, severity = ?e.severity, "{}", e.message)
                }
                ErrorSeverity::Medium | ErrorSeverity::Low => {
                    warn!(field = %e.field, severity = ?e.severity, "{}", e.message)
                }
            }
        }

        for w in &result.warnings {
            warn!(field = %w.field, recommendation = %w.recommendation, "{}", w.message);
        }

        for recommendation in &result.recommendations {
            info!("Recommendation: {}", recommendation);
        }
    }
}

/// Validate and log the configuration, failing only on critical errors
pub fn validate_config(config: &WebConfig) -> WebResult<ValidationResult> {
    let result = ConfigValidator::validate_config(config);
    ConfigValidator::log_validation_results(&result);

    if !result.is_valid {
        return Err(WebError::Config(
            "Configuration validation failed".to_string(),
        ));
    }

    Ok(result)
}
