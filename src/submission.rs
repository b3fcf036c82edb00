//! Lead submission handler.
//!
//! Delivers a validated lead to the webhook through a fixed, strictly
//! sequential chain of strategies and folds the attempt log into a single
//! [`SubmissionOutcome`].
//!
//! The opaque strategies cannot see what the webhook did with the request, so
//! any response that arrives without a transport error is counted as a
//! tentative success. This is a heuristic, not a guarantee from the webhook.

use crate::config::Config;
use crate::errors::{AppError, SubmissionError};
use crate::models::{ContactForm, ContactSubmission, SubmissionOutcome, WebhookAck};
use crate::webhook_client::{
    AttemptResult, DeliveryStrategy, LeadWebhookClient, TransportFailureKind,
};
use std::time::Duration;
use uuid::Uuid;

pub const CONNECTIVITY_MESSAGE: &str =
    "Connection failed. Please check your internet connection and try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Unable to submit form. Please try again.";
pub const DEFAULT_SERVER_FAILURE_MESSAGE: &str = "Submission failed";

/// Simulated round trip used when no real webhook is configured.
pub const DEMO_DELAY: Duration = Duration::from_secs(2);

/// Attempt log: each strategy tried, in order, with what it produced.
pub type AttemptLog = Vec<(DeliveryStrategy, AttemptResult)>;

#[derive(Clone)]
pub struct LeadSubmitter {
    client: LeadWebhookClient,
    source: String,
    demo_delay: Option<Duration>,
}

impl LeadSubmitter {
    pub fn new(client: LeadWebhookClient, source: impl Into<String>) -> Self {
        Self {
            client,
            source: source.into(),
            demo_delay: None,
        }
    }

    /// Skips the network entirely and reports success after `delay`.
    pub fn with_demo_mode(mut self, delay: Duration) -> Self {
        self.demo_delay = Some(delay);
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = LeadWebhookClient::new(config.webhook_url.clone(), config.webhook_timeout)?;
        let submitter = Self::new(client, config.lead_source.clone());

        Ok(if config.demo_mode {
            submitter.with_demo_mode(DEMO_DELAY)
        } else {
            submitter
        })
    }

    pub fn is_demo(&self) -> bool {
        self.demo_delay.is_some()
    }

    /// Validates the form and delivers it, resolving to exactly one outcome.
    pub async fn submit(&self, form: &ContactForm) -> SubmissionOutcome {
        let submission = match ContactSubmission::from_form(form, &self.source) {
            Ok(submission) => submission,
            Err(err) => {
                tracing::info!("Lead rejected before delivery: {}", err);
                return SubmissionOutcome::Failure(err);
            }
        };

        let submission_id = Uuid::new_v4();

        if let Some(delay) = self.demo_delay {
            tracing::info!(
                "Demo mode: simulating delivery of lead {} from {}",
                submission_id,
                submission.company
            );
            tokio::time::sleep(delay).await;
            return SubmissionOutcome::Success;
        }

        tracing::info!(
            "Delivering lead {} ({}) to {}",
            submission_id,
            submission.company,
            self.client.endpoint()
        );

        let attempts = self.deliver(&submission).await;
        let outcome = resolve_outcome(&attempts);

        match &outcome {
            SubmissionOutcome::Success => tracing::info!(
                "✓ Lead {} delivered after {} attempt(s)",
                submission_id,
                attempts.len()
            ),
            SubmissionOutcome::Failure(err) => {
                tracing::warn!("Lead {} not delivered: {}", submission_id, err)
            }
        }

        outcome
    }

    /// Runs the strategy chain, stopping at the first attempt that ends it.
    pub async fn deliver(&self, submission: &ContactSubmission) -> AttemptLog {
        let mut attempts = Vec::with_capacity(DeliveryStrategy::CHAIN.len());

        for strategy in DeliveryStrategy::CHAIN {
            let result = self.client.attempt(strategy, submission).await;
            let done = result.ends_chain();
            attempts.push((strategy, result));
            if done {
                break;
            }
        }

        attempts
    }
}

/// Folds an attempt log into the outcome reported to the visitor.
///
/// * opaque response last ⇒ tentative success
/// * readable 2xx ⇒ decided by the (advisory) body
/// * otherwise ⇒ failure derived from the last transport error
pub fn resolve_outcome(attempts: &[(DeliveryStrategy, AttemptResult)]) -> SubmissionOutcome {
    if let Some((strategy, AttemptResult::Opaque)) = attempts.last() {
        tracing::debug!(
            "Assuming success from opaque '{}' response",
            strategy.label()
        );
        return SubmissionOutcome::Success;
    }

    let readable_ok = attempts.iter().find_map(|(_, result)| match result {
        AttemptResult::Readable { status, body } if status.is_success() => Some(body),
        _ => None,
    });
    if let Some(body) = readable_ok {
        return interpret_body(body);
    }

    let last_failure = attempts.iter().rev().find_map(|(_, result)| match result {
        AttemptResult::TransportFailed(failure) => Some(failure),
        _ => None,
    });

    let message = match last_failure {
        Some(failure) if failure.kind == TransportFailureKind::Connectivity => {
            CONNECTIVITY_MESSAGE
        }
        Some(_) => GENERIC_FAILURE_MESSAGE,
        None => {
            return SubmissionOutcome::Failure(SubmissionError::Server(
                GENERIC_FAILURE_MESSAGE.to_string(),
            ))
        }
    };

    SubmissionOutcome::Failure(SubmissionError::Transport(message.to_string()))
}

/// Reads the body of a readable 2xx response.
///
/// Only an explicit failure indicator turns it into a failure; an unparseable
/// or indicator-free body still counts as success.
pub fn interpret_body(body: &str) -> SubmissionOutcome {
    let ack: WebhookAck = match serde_json::from_str(body) {
        Ok(ack) => ack,
        Err(_) => {
            tracing::debug!("Webhook body is not JSON, status was OK: assuming success");
            return SubmissionOutcome::Success;
        }
    };

    match ack.succeeded() {
        Some(false) => SubmissionOutcome::Failure(SubmissionError::Server(
            ack.message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVER_FAILURE_MESSAGE.to_string()),
        )),
        Some(true) | None => SubmissionOutcome::Success,
    }
}
