//! Coursegate Client - login form controller
//!
//! Drives the course login flow: local input checks, the validation call,
//! storing the access grant and redirecting to the course page.

pub mod api;
pub mod config;
pub mod form;
pub mod page;
pub mod storage;
pub mod terminal;

pub use api::{HttpValidationClient, ValidationApi};
pub use config::ClientConfig;
pub use form::{AccessForm, Field, FormView, Navigator, StatusKind, SubmitOutcome};
pub use page::PageParams;
pub use storage::{tolerate, EmailStore, FileStore, GrantStore, MemoryStore};
pub use terminal::{PrintNavigator, TerminalView};
