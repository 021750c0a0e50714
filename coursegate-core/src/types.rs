//! Data shared between the endpoint and the form controller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::access_root::derive_access_root;

/// Path of the validation endpoint, relative to the site origin
pub const VALIDATE_PATH: &str = "/api/validate-code";

/// Redirect target when neither the course record nor the page supplies one
pub const DEFAULT_NEXT_PATH: &str = "/index.html";

/// Session storage key holding the current grant
pub const ACCESS_KEY: &str = "courseAccess";

/// Persistent storage key holding the last email used
pub const EMAIL_KEY: &str = "lastCourseEmail";

/// Proof of a successful validation, scoped to a directory of course pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub email: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub granted_at: DateTime<Utc>,
    pub access_root: String,
}

impl AccessGrant {
    /// Create a grant stamped now. `access_root` is re-derived, so the stored
    /// value is always a directory scope even if the caller passed a file path.
    pub fn new(email: impl Into<String>, access_root: &str) -> Self {
        Self {
            email: email.into(),
            granted_at: Utc::now(),
            access_root: derive_access_root(access_root),
        }
    }
}

/// Course entry in the backing store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl CourseRecord {
    pub fn new(code: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            redirect_to: Some(redirect_to.into()),
            active: None,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = Some(false);
        self
    }

    /// Records are active unless explicitly switched off
    pub fn is_active(&self) -> bool {
        self.active != Some(false)
    }

    /// Redirect target, falling back to [`DEFAULT_NEXT_PATH`]
    pub fn next_path(&self) -> &str {
        self.redirect_to
            .as_deref()
            .filter(|path| !path.is_empty())
            .unwrap_or(DEFAULT_NEXT_PATH)
    }
}

/// Body sent by the form controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub email: String,
    pub course_code: String,
}

/// Body returned by the endpoint for every status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_root: Option<String>,
}

impl ValidateResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            next_path: None,
            access_root: None,
        }
    }

    /// Successful response for `next_path`, with its access root
    pub fn granted(next_path: &str) -> Self {
        Self {
            message: "Access granted.".to_string(),
            next_path: Some(next_path.to_string()),
            access_root: Some(derive_access_root(next_path)),
        }
    }
}
