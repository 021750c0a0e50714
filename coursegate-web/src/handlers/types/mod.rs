//! Type definitions for handlers
//!
//! Request/response types used by the handlers. The validation payloads are
//! shared with the form controller and live in `coursegate-core`.

pub mod common;

pub use common::*;
pub use coursegate_core::{ValidateRequest, ValidateResponse};
