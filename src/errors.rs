use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Why a lead submission did not go through.
///
/// Every variant carries the short message shown to the visitor; the UI does
/// not distinguish kinds beyond that text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Missing or malformed form field. No network call was made.
    Validation(String),
    /// Every delivery strategy failed before reaching the webhook.
    Transport(String),
    /// The webhook answered readably but reported a failure.
    Server(String),
}

impl SubmissionError {
    /// User-facing message for the status banner.
    pub fn message(&self) -> &str {
        match self {
            SubmissionError::Validation(msg)
            | SubmissionError::Transport(msg)
            | SubmissionError::Server(msg) => msg,
        }
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::Validation(msg) => write!(f, "Validation error: {}", msg),
            SubmissionError::Transport(msg) => write!(f, "Transport error: {}", msg),
            SubmissionError::Server(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for SubmissionError {}

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Lead submission failed.
    Submission(SubmissionError),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// The same form instance already has a submission running.
    Conflict(String),
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Submission(e) => write!(f, "{}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// The body always has the `{"status": "error", "message": ...}` shape the
    /// landing page renders into its banner.
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Submission(SubmissionError::Validation(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            AppError::Submission(err) => {
                tracing::error!("Lead submission failed: {}", err);
                (StatusCode::BAD_GATEWAY, err.message().to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        AppError::Submission(err)
    }
}
