use crate::errors::AppError;
use crate::models::ContactSubmission;
use reqwest::{multipart, StatusCode};
use std::time::Duration;

/// Browser-style fetch mode advertised to the webhook on every attempt.
const FETCH_MODE_HEADER: &str = "Sec-Fetch-Mode";

/// One way of delivering a lead to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStrategy {
    /// JSON body, response fully readable.
    Cors,
    /// Same JSON body, response treated as opaque.
    NoCors,
    /// Multipart form fields, response treated as opaque.
    FormData,
}

impl DeliveryStrategy {
    /// Fixed priority order: most informative first.
    pub const CHAIN: [DeliveryStrategy; 3] = [
        DeliveryStrategy::Cors,
        DeliveryStrategy::NoCors,
        DeliveryStrategy::FormData,
    ];

    /// Opaque strategies never look at the response status or body.
    pub fn is_opaque(self) -> bool {
        !matches!(self, DeliveryStrategy::Cors)
    }

    pub fn fetch_mode(self) -> &'static str {
        match self {
            DeliveryStrategy::Cors => "cors",
            DeliveryStrategy::NoCors | DeliveryStrategy::FormData => "no-cors",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeliveryStrategy::Cors => "json",
            DeliveryStrategy::NoCors => "json-opaque",
            DeliveryStrategy::FormData => "form-data-opaque",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    /// Could not reach the webhook at all (refused, DNS, timeout).
    Connectivity,
    Other,
}

/// A request that never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: TransportFailureKind,
    pub detail: String,
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_connect() || err.is_timeout() {
            TransportFailureKind::Connectivity
        } else {
            TransportFailureKind::Other
        };

        Self {
            kind,
            detail: err.to_string(),
        }
    }
}

/// What a single delivery attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Readable { status: StatusCode, body: String },
    /// A response arrived but its contents are, by contract, unknowable.
    Opaque,
    TransportFailed(TransportFailure),
}

impl AttemptResult {
    /// Whether the fallback chain stops after this attempt.
    pub fn ends_chain(&self) -> bool {
        match self {
            AttemptResult::Readable { status, .. } => status.is_success(),
            AttemptResult::Opaque => true,
            AttemptResult::TransportFailed(_) => false,
        }
    }
}

/// Client for the spreadsheet-backed lead webhook.
#[derive(Clone)]
pub struct LeadWebhookClient {
    client: reqwest::Client,
    endpoint: String,
}

impl LeadWebhookClient {
    /// Creates a new `LeadWebhookClient`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The webhook URL leads are POSTed to.
    /// * `timeout` - Optional per-request timeout; `None` keeps the transport default.
    pub fn new(endpoint: String, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create webhook client: {}", e))
        })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Performs one delivery attempt with the given strategy.
    ///
    /// Never fails: transport errors are reported as
    /// `AttemptResult::TransportFailed`.
    pub async fn attempt(
        &self,
        strategy: DeliveryStrategy,
        submission: &ContactSubmission,
    ) -> AttemptResult {
        let request = self
            .client
            .post(&self.endpoint)
            .header(FETCH_MODE_HEADER, strategy.fetch_mode());

        let request = match strategy {
            DeliveryStrategy::Cors | DeliveryStrategy::NoCors => request.json(submission),
            DeliveryStrategy::FormData => {
                let form = submission
                    .form_fields()
                    .into_iter()
                    .fold(multipart::Form::new(), |form, (field, value)| {
                        form.text(field, value.to_string())
                    });
                request.multipart(form)
            }
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Webhook attempt '{}' failed: {}", strategy.label(), e);
                return AttemptResult::TransportFailed(e.into());
            }
        };

        if strategy.is_opaque() {
            tracing::debug!("Webhook attempt '{}' completed (opaque)", strategy.label());
            return AttemptResult::Opaque;
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to read webhook response body: {}", e);
            String::new()
        });
        tracing::debug!(
            "Webhook attempt '{}' returned {}",
            strategy.label(),
            status
        );

        AttemptResult::Readable { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LeadWebhookClient::new("https://example.com/exec".to_string(), None);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().endpoint(), "https://example.com/exec");
    }

    #[test]
    fn test_chain_order_and_modes() {
        let modes: Vec<_> = DeliveryStrategy::CHAIN
            .iter()
            .map(|s| (s.fetch_mode(), s.is_opaque()))
            .collect();
        assert_eq!(
            modes,
            vec![("cors", false), ("no-cors", true), ("no-cors", true)]
        );
    }

    #[test]
    fn test_ends_chain() {
        let ok = AttemptResult::Readable {
            status: StatusCode::OK,
            body: String::new(),
        };
        let rejected = AttemptResult::Readable {
            status: StatusCode::FORBIDDEN,
            body: String::new(),
        };
        let failed = AttemptResult::TransportFailed(TransportFailure {
            kind: TransportFailureKind::Connectivity,
            detail: "refused".into(),
        });

        assert!(ok.ends_chain());
        assert!(AttemptResult::Opaque.ends_chain());
        assert!(!rejected.ends_chain());
        assert!(!failed.ends_chain());
    }
}
