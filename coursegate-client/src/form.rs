//! Login form controller
//!
//! Checks the inputs locally, calls the validation endpoint and on success
//! records an [`AccessGrant`] before navigating to the course page. Rendering
//! and navigation are behind [`FormView`] and [`Navigator`] so the same
//! controller drives a terminal or a test double.

use crate::{
    api::ValidationApi,
    page::PageParams,
    storage::{tolerate, EmailStore, GrantStore},
};
use coursegate_core::{
    derive_access_root, log_operation_start, log_operation_success,
    validation::{is_institutional_email, is_present},
    AccessGrant, ValidateRequest,
};
use std::sync::Arc;
use tracing::{info, warn};

pub const EMAIL_HINT: &str = "Use your Laurier email in the form abcd1234@mylaurier.ca.";
pub const CODE_REQUIRED: &str = "Your course code is required.";
pub const ACCESS_GRANTED: &str = "Access granted. Redirecting…";
pub const ACCESS_DENIED: &str =
    "Access denied. Please double-check your details or contact your professor.";

/// Submit button label while a request is in flight
pub const LOADING_LABEL: &str = "Checking…";
pub const IDLE_LABEL: &str = "Request access";

/// Input field of the login form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    CourseCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Rendering surface of the login form
pub trait FormView {
    /// Show a status line. An empty message clears it.
    fn set_status(&mut self, message: &str, kind: StatusKind);

    /// Disable or re-enable submission and toggle the busy indicator
    fn set_loading(&mut self, loading: bool);

    fn focus(&mut self, field: Field);

    /// Show the selected course banner
    fn show_course(&mut self, course: &str);

    /// Fill the email field with a remembered value
    fn prefill_email(&mut self, email: &str);
}

/// Leaves the login page
pub trait Navigator {
    /// Replace the current page with `destination`
    fn redirect(&mut self, destination: &str);
}

/// How a submission ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Rejected locally, no request was made
    Invalid(Field),
    Granted {
        destination: String,
        grant: AccessGrant,
    },
    Denied,
}

impl SubmitOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, SubmitOutcome::Granted { .. })
    }
}

/// Login form controller
pub struct AccessForm<A> {
    api: A,
    grants: Arc<dyn GrantStore>,
    emails: Arc<dyn EmailStore>,
    page: PageParams,
}

impl<A: ValidationApi> AccessForm<A> {
    pub fn new(
        api: A,
        grants: Arc<dyn GrantStore>,
        emails: Arc<dyn EmailStore>,
        page: PageParams,
    ) -> Self {
        Self {
            api,
            grants,
            emails,
            page,
        }
    }

    pub fn page(&self) -> &PageParams {
        &self.page
    }

    /// Restore the remembered email and show the course banner, if any
    pub fn hydrate(&self, view: &mut dyn FormView) {
        if let Some(email) = tolerate("load email", self.emails.load_email()).flatten() {
            if !email.is_empty() {
                view.prefill_email(&email);
            }
        }

        if let Some(course) = self.page.course_label() {
            view.show_course(course);
        }
    }

    /// Handle a form submission
    pub async fn submit(
        &self,
        email: &str,
        course_code: &str,
        view: &mut dyn FormView,
        navigator: &mut dyn Navigator,
    ) -> SubmitOutcome {
        let email = email.trim();
        let course_code = course_code.trim();

        if !is_institutional_email(email) {
            view.set_status(EMAIL_HINT, StatusKind::Error);
            view.focus(Field::Email);
            return SubmitOutcome::Invalid(Field::Email);
        }

        if !is_present(course_code) {
            view.set_status(CODE_REQUIRED, StatusKind::Error);
            view.focus(Field::CourseCode);
            return SubmitOutcome::Invalid(Field::CourseCode);
        }

        view.set_loading(true);
        view.set_status("", StatusKind::Success);

        let outcome = self.attempt(email, course_code, view, navigator).await;

        view.set_loading(false);
        outcome
    }

    async fn attempt(
        &self,
        email: &str,
        course_code: &str,
        view: &mut dyn FormView,
        navigator: &mut dyn Navigator,
    ) -> SubmitOutcome {
        log_operation_start!("course_login", course_code = course_code);

        let request = ValidateRequest {
            email: email.to_string(),
            course_code: course_code.to_string(),
        };

        let response = match self.api.validate(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Course login rejected");
                view.set_status(ACCESS_DENIED, StatusKind::Error);
                return SubmitOutcome::Denied;
            }
        };

        let destination = response
            .next_path
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| self.page.next.clone());
        let access_root = response
            .access_root
            .filter(|root| !root.is_empty())
            .unwrap_or_else(|| derive_access_root(&destination));

        let grant = AccessGrant::new(email, &access_root);
        tolerate("save grant", self.grants.save_grant(&grant));
        tolerate("save email", self.emails.save_email(email));

        info!(access_root = %grant.access_root, "Access granted");
        log_operation_success!("course_login", destination = destination.as_str());

        view.set_status(ACCESS_GRANTED, StatusKind::Success);
        navigator.redirect(&destination);

        SubmitOutcome::Granted { destination, grant }
    }
}
