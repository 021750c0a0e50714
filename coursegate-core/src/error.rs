//! Unified error handling
//!
//! Structured error types carrying an [`ErrorContext`] so failures can be
//! logged with an id on the server while callers only see a generic message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, warn};

pub type GateResult<T> = Result<T, GateError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for correlating log lines
    pub error_id: String,
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    pub metadata: HashMap<String, String>,
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the course gate
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Access denied: {message}")]
    AccessDenied {
        message: String,
        status: Option<u16>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl GateError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            GateError::Config { context, .. } => Some(context),
            GateError::Validation { context, .. } => Some(context),
            GateError::Storage { context, .. } => Some(context),
            GateError::Network { context, .. } => Some(context),
            GateError::AccessDenied { context, .. } => Some(context),
            GateError::Internal { context, .. } => Some(context),
            GateError::Io(_) | GateError::Serialization(_) => None,
        }
    }

    /// Field the error refers to, for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            GateError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            GateError::Validation { .. } | GateError::AccessDenied { .. } => {
                debug!(error_id = ?error_id, error = %self, "Request rejected");
            }
            GateError::Network { .. } => {
                warn!(error_id = ?error_id, error = %self, "Network error");
            }
            GateError::Config { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration error");
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::GateError::Config {
            message: $msg.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the COURSEGATE_* environment variables"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::GateError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::GateError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::GateError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_attach_context() {
        let err = config_error!("COURSEGATE_DATABASE_URL is not set", "store");
        let context = err.context().unwrap();
        assert_eq!(context.component, "store");
        assert!(!context.recovery_suggestions.is_empty());
        assert_eq!(
            err.to_string(),
            "Configuration error: COURSEGATE_DATABASE_URL is not set"
        );

        let err = validation_error!("Invalid email format.", "email", "endpoint");
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn test_storage_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = storage_error!("Failed to open store", "store", io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.context().is_some());
    }

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("client")
            .with_operation("submit")
            .with_metadata("status", "401");
        assert_eq!(context.operation.as_deref(), Some("submit"));
        assert_eq!(context.metadata.get("status").map(String::as_str), Some("401"));
        assert_eq!(context.error_id.len(), 36);
    }
}
