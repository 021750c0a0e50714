//! HTTP request handlers for the Coursegate web server

pub mod health;
pub mod types;
pub mod validate;

pub use health::*;
pub use types::*;
pub use validate::*;
