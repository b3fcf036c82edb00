/// Integration tests for the lead submission handler against a mocked webhook
/// Exercises the fallback chain without hitting the real spreadsheet endpoint
use procure_leads::errors::SubmissionError;
use procure_leads::models::{ContactForm, ContactSubmission, SubmissionOutcome};
use procure_leads::submission::{LeadSubmitter, CONNECTIVITY_MESSAGE};
use procure_leads::webhook_client::{AttemptResult, DeliveryStrategy, LeadWebhookClient};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to build the standard test lead
fn jane() -> ContactForm {
    ContactForm {
        name: "Jane Doe".to_string(),
        email: "jane@acme.com".to_string(),
        company: "Acme".to_string(),
    }
}

fn client_for(base: &str) -> LeadWebhookClient {
    LeadWebhookClient::new(format!("{}/exec", base), None).unwrap()
}

fn submitter_for(base: &str) -> LeadSubmitter {
    LeadSubmitter::new(client_for(base), "Landing Page CTA")
}

/// Address nothing is listening on
fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_readable_success_on_first_strategy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(header("sec-fetch-mode", "cors"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "name": "Jane Doe",
            "email": "jane@acme.com",
            "company": "Acme",
            "source": "Landing Page CTA"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    // No fallback once the first strategy succeeded
    Mock::given(method("POST"))
        .and(header("sec-fetch-mode", "no-cors"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let outcome = submitter_for(&mock_server.uri()).submit(&jane()).await;

    assert_eq!(outcome, SubmissionOutcome::Success);
}

#[tokio::test]
async fn test_rejected_first_strategy_falls_back_to_opaque() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(header("sec-fetch-mode", "cors"))
        .respond_with(ResponseTemplate::new(403).set_body_string("CORS request rejected"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(header("sec-fetch-mode", "no-cors"))
        .and(body_partial_json(json!({"email": "jane@acme.com"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = submitter_for(&mock_server.uri()).submit(&jane()).await;

    assert_eq!(outcome, SubmissionOutcome::Success);
}

#[tokio::test]
async fn test_opaque_response_contents_are_ignored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("sec-fetch-mode", "cors"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    // Even an explicit failure is invisible in opaque mode
    Mock::given(method("POST"))
        .and(header("sec-fetch-mode", "no-cors"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"success": false, "message": "nope"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = submitter_for(&mock_server.uri()).submit(&jane()).await;

    assert_eq!(outcome, SubmissionOutcome::Success);
}

#[tokio::test]
async fn test_explicit_failure_reports_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("sec-fetch-mode", "cors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Sheet is full"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(header("sec-fetch-mode", "no-cors"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let outcome = submitter_for(&mock_server.uri()).submit(&jane()).await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Failure(SubmissionError::Server("Sheet is full".to_string()))
    );
}

#[tokio::test]
async fn test_non_json_ok_body_is_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("sec-fetch-mode", "cors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Saved</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = submitter_for(&mock_server.uri()).submit(&jane()).await;

    assert_eq!(outcome, SubmissionOutcome::Success);
}

#[tokio::test]
async fn test_unreachable_endpoint_reports_connectivity() {
    let outcome = submitter_for(&unreachable_base()).submit(&jane()).await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Failure(SubmissionError::Transport(CONNECTIVITY_MESSAGE.to_string()))
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_tries_every_strategy() {
    let base = unreachable_base();
    let submission = ContactSubmission::from_form(&jane(), "Landing Page CTA").unwrap();

    let attempts = submitter_for(&base).deliver(&submission).await;

    let strategies: Vec<_> = attempts.iter().map(|(s, _)| *s).collect();
    assert_eq!(strategies, DeliveryStrategy::CHAIN.to_vec());
    assert!(attempts
        .iter()
        .all(|(_, r)| matches!(r, AttemptResult::TransportFailed(_))));
}

#[tokio::test]
async fn test_invalid_fields_never_reach_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let submitter = submitter_for(&mock_server.uri());

    for form in [
        ContactForm {
            company: "  ".to_string(),
            ..jane()
        },
        ContactForm {
            email: "foo".to_string(),
            ..jane()
        },
        ContactForm {
            email: "foo@".to_string(),
            ..jane()
        },
        ContactForm {
            email: "foo@bar".to_string(),
            ..jane()
        },
    ] {
        let outcome = submitter.submit(&form).await;
        assert!(matches!(
            outcome,
            SubmissionOutcome::Failure(SubmissionError::Validation(_))
        ));
    }
}

#[tokio::test]
async fn test_form_data_strategy_sends_multipart_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(header("sec-fetch-mode", "no-cors"))
        .and(body_string_contains("name=\"company\""))
        .and(body_string_contains("name=\"timestamp\""))
        .and(body_string_contains("Acme"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let submission = ContactSubmission::from_form(&jane(), "Landing Page CTA").unwrap();
    let result = client_for(&mock_server.uri())
        .attempt(DeliveryStrategy::FormData, &submission)
        .await;

    assert_eq!(result, AttemptResult::Opaque);
}

#[tokio::test]
async fn test_readable_attempt_captures_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("sec-fetch-mode", "cors"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let submission = ContactSubmission::from_form(&jane(), "Landing Page CTA").unwrap();
    let result = client_for(&mock_server.uri())
        .attempt(DeliveryStrategy::Cors, &submission)
        .await;

    assert_eq!(
        result,
        AttemptResult::Readable {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "maintenance".to_string(),
        }
    );
}
