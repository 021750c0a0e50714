//! Input shape checks shared by the form controller and the endpoint

use regex::Regex;
use std::sync::OnceLock;

static INSTITUTIONAL_EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static LOOSE_EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Strict client-side check: four letters, four digits, Laurier domain.
/// Case-insensitive, ASCII only.
pub fn is_institutional_email(email: &str) -> bool {
    let regex = INSTITUTIONAL_EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^(?i-u)[a-z]{4}[0-9]{4}@mylaurier\.ca$").unwrap());
    regex.is_match(email)
}

/// Server-side check: something before the `@`, and a dot in the domain
pub fn is_plausible_email(email: &str) -> bool {
    let regex =
        LOOSE_EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    regex.is_match(email)
}

/// A course code is usable when anything remains after trimming
pub fn is_present(code: &str) -> bool {
    !code.trim().is_empty()
}
