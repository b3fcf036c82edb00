use crate::errors::SubmissionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contact form fields exactly as the landing page posts them.
///
/// Absent fields default to empty strings so that a missing field is reported
/// as a validation failure rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
}

/// A validated lead, built fresh for every submit call.
///
/// Serializes to the JSON body sent to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: String,
    pub source: String,
    /// ISO-8601 UTC instant, millisecond precision.
    pub timestamp: String,
}

impl ContactSubmission {
    /// Field/value pairs in the order the multipart fallback sends them.
    pub fn form_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("company", self.company.as_str()),
            ("source", self.source.as_str()),
            ("timestamp", self.timestamp.as_str()),
        ]
    }
}

/// Result of one user-initiated submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failure(SubmissionError),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success)
    }

    /// Message for the failure banner, if any.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success => None,
            SubmissionOutcome::Failure(err) => Some(err.message()),
        }
    }
}

/// Optional structured body returned by the webhook on a readable response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookAck {
    #[serde(default)]
    pub success: Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl WebhookAck {
    /// Interprets the boolean-like `success` indicator.
    ///
    /// `None` means the body carried no indicator at all.
    pub fn succeeded(&self) -> Option<bool> {
        match &self.success {
            Value::Null => None,
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(true)),
            Value::String(s) => Some(!matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "0" | "no"
            )),
            Value::Array(_) | Value::Object(_) => Some(true),
        }
    }
}

/// Body returned to the landing page after a successful submit.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub status: String,
    pub message: String,
    /// Tells the page to reset its inputs.
    pub clear_form: bool,
}

impl SubmissionResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: "Thanks! We'll be in touch soon.".to_string(),
            clear_form: true,
        }
    }
}
