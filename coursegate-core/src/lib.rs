//! Coursegate Core - shared logic for the course access gate
//!
//! The access root deriver, input checks and data model used by both the
//! validation endpoint and the form controller.

pub mod access_root;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;
pub mod validation;

pub use access_root::{derive_access_root, is_access_root, normalize_path};
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
