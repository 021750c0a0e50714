//! Login page parameters
//!
//! The login page is reached with `?next=<path>&course=<label>`; `next` is
//! where to go after a successful login and `course` is a display label.

use coursegate_core::DEFAULT_NEXT_PATH;
use url::Url;

/// Query parameters of the login page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    /// Fallback destination when the server does not supply one
    pub next: String,
    /// Raw `course` parameter, untrimmed
    pub course: Option<String>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            next: DEFAULT_NEXT_PATH.to_string(),
            course: None,
        }
    }
}

impl PageParams {
    pub fn new(next: Option<String>, course: Option<String>) -> Self {
        Self {
            next: next
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_NEXT_PATH.to_string()),
            course,
        }
    }

    /// Read `next` and `course` from the page URL's query string.
    /// The first occurrence of each parameter wins.
    pub fn from_url(url: &Url) -> Self {
        let mut next = None;
        let mut course = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "next" if next.is_none() => next = Some(value.into_owned()),
                "course" if course.is_none() => course = Some(value.into_owned()),
                _ => {}
            }
        }
        Self::new(next, course)
    }

    /// Course label to show in the banner, if it is not blank
    pub fn course_label(&self) -> Option<&str> {
        self.course
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
