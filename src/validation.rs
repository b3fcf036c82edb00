use crate::errors::SubmissionError;
use crate::models::{ContactForm, ContactSubmission};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    // local@domain.tld with no whitespace and a single '@'
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

/// Basic `local@domain.tld` check used by the lead form.
///
/// Deliberately loose: it rejects obvious typos (`foo`, `foo@`, `foo@bar`)
/// and leaves deliverability to the sales team.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

impl ContactSubmission {
    /// Validates raw form fields and stamps them with `source` and the current time.
    ///
    /// # Errors
    ///
    /// * `SubmissionError::Validation` if a field is blank after trimming or
    ///   the email, untrimmed, does not look like `local@domain.tld`.
    pub fn from_form(form: &ContactForm, source: &str) -> Result<Self, SubmissionError> {
        let name = form.name.trim();
        let company = form.company.trim();

        if name.is_empty() || form.email.trim().is_empty() || company.is_empty() {
            return Err(SubmissionError::Validation(
                MISSING_FIELDS_MESSAGE.to_string(),
            ));
        }

        // Checked as typed: surrounding whitespace is a malformed address.
        let email = form.email.as_str();
        if !is_valid_email(email) {
            tracing::debug!("Rejected malformed email: {:?}", email);
            return Err(SubmissionError::Validation(INVALID_EMAIL_MESSAGE.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            company: company.to_string(),
            source: source.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}
