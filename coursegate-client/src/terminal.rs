//! Terminal rendering of the login form

use crate::form::{Field, FormView, Navigator, StatusKind, IDLE_LABEL, LOADING_LABEL};
use std::io::Write;
use url::Url;

/// [`FormView`] writing status lines to a terminal (or any writer)
pub struct TerminalView<W: Write> {
    out: W,
    prefilled_email: Option<String>,
    focused: Option<Field>,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            prefilled_email: None,
            focused: None,
        }
    }

    /// Email restored from persistent storage, if any
    pub fn prefilled_email(&self) -> Option<&str> {
        self.prefilled_email.as_deref()
    }

    /// Field the form asked to focus after a local validation failure
    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Write failures are ignored
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }
}

impl<W: Write> FormView for TerminalView<W> {
    fn set_status(&mut self, message: &str, kind: StatusKind) {
        if message.is_empty() {
            return;
        }
        match kind {
            StatusKind::Success => self.line(&format!("✓ {}", message)),
            StatusKind::Error => self.line(&format!("✗ {}", message)),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            self.line(LOADING_LABEL);
        } else {
            tracing::trace!(label = IDLE_LABEL, "Form ready");
        }
    }

    fn focus(&mut self, field: Field) {
        self.focused = Some(field);
    }

    fn show_course(&mut self, course: &str) {
        self.line(&format!("Course: {}", course));
    }

    fn prefill_email(&mut self, email: &str) {
        self.prefilled_email = Some(email.to_string());
    }
}

/// [`Navigator`] that prints the resolved destination instead of opening it
pub struct PrintNavigator {
    base: Url,
    destination: Option<Url>,
}

impl PrintNavigator {
    /// Relative destinations are resolved against `base`, the login page URL
    pub fn new(base: Url) -> Self {
        Self {
            base,
            destination: None,
        }
    }

    pub fn destination(&self) -> Option<&Url> {
        self.destination.as_ref()
    }
}

impl Navigator for PrintNavigator {
    fn redirect(&mut self, destination: &str) {
        match self.base.join(destination) {
            Ok(url) => {
                println!("Open {}", url);
                self.destination = Some(url);
            }
            Err(e) => {
                tracing::warn!(destination = destination, error = %e, "Cannot resolve destination");
                println!("Open {}", destination);
            }
        }
    }
}
