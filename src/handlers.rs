use crate::banner::{BannerState, StatusBanner};
use crate::config::Config;
use crate::errors::AppError;
use crate::landing;
use crate::models::{ContactForm, SubmissionOutcome, SubmissionResponse};
use crate::submission::LeadSubmitter;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use moka::future::Cache;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Header the landing page uses to identify one rendered form.
pub const FORM_INSTANCE_HEADER: &str = "x-form-instance";

// Contact forms are tiny; 64KB is generous.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Delivers validated leads to the webhook.
    pub submitter: LeadSubmitter,
    /// Form instances with a submission currently running.
    /// Key: form instance key, Value: unix timestamp the submission started.
    pub in_flight: Cache<String, i64>,
    /// Status banner per form instance; idle banners are evicted after 30 minutes.
    pub banners: Cache<String, StatusBanner>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let submitter = LeadSubmitter::from_config(&config)?;

        // A submit that hangs longer than this is abandoned by the guard.
        let in_flight = Cache::builder()
            .time_to_live(Duration::from_secs(300))
            .max_capacity(10_000)
            .build();

        let banners = Cache::builder()
            .time_to_idle(Duration::from_secs(1800))
            .max_capacity(10_000)
            .build();

        Ok(Self {
            config,
            submitter,
            in_flight,
            banners,
        })
    }
}

/// Builds the application router.
///
/// Rate limiting applies to the API routes only, so health checks and the
/// page itself are never throttled.
pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let api = Router::new()
        .route("/api/v1/leads", post(submit_lead))
        .route("/api/v1/leads/status", get(submission_status));

    let api = if let Some(per_second) = state.config.rate_limit_per_second {
        // Governor takes the replenish interval, not a rate.
        let replenish_ms = (1000 / per_second).max(1);
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_millisecond(replenish_ms)
                .burst_size(state.config.rate_limit_burst)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
        );
        api.layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
    } else {
        api.layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
    };

    Ok(Router::new()
        .route("/", get(landing::serve_landing_page))
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "procure-leads",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/leads
///
/// Runs the lead submission handler for one form instance and records the
/// outcome on that instance's status banner.
///
/// # Returns
///
/// * `200` with `clear_form: true` on success.
/// * `409` if the same form instance already has a submission running.
/// * `422` / `502` with `{"status": "error", "message": ...}` otherwise.
/// * `500` if the delivery task panicked.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let key = form_instance_key(&headers, &form);
    tracing::info!("POST /leads - form instance {}", key);

    let entry = state
        .in_flight
        .entry(key.clone())
        .or_insert(chrono::Utc::now().timestamp())
        .await;
    if !entry.is_fresh() {
        tracing::warn!("Rejected concurrent submission for form instance {}", key);
        return Err(AppError::Conflict(
            "A submission is already in progress".to_string(),
        ));
    }

    // Detached so a dropped request neither cancels the chain nor leaks the guard.
    let task_state = Arc::clone(&state);
    let task_key = key.clone();
    let delivery = tokio::spawn(async move {
        let ttl = task_state.config.banner_ttl;
        let banner = task_state
            .banners
            .get_with(task_key.clone(), async move { StatusBanner::new(ttl) })
            .await;
        banner.begin_submission();

        let outcome = task_state.submitter.submit(&form).await;

        task_state.in_flight.invalidate(&task_key).await;
        banner.show(&outcome);
        outcome
    });

    let outcome = match delivery.await {
        Ok(outcome) => outcome,
        Err(e) => {
            state.in_flight.invalidate(&key).await;
            return Err(AppError::InternalError(format!(
                "Submission task for {} failed: {}",
                key, e
            )));
        }
    };

    match outcome {
        SubmissionOutcome::Success => Ok(Json(SubmissionResponse::success())),
        SubmissionOutcome::Failure(err) => Err(err.into()),
    }
}

/// GET /api/v1/leads/status
///
/// Current banner for the form instance named by the `X-Form-Instance` header.
/// Unknown instances are reported as idle.
pub async fn submission_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BannerState>, AppError> {
    let key = header_instance(&headers).ok_or_else(|| {
        AppError::BadRequest("X-Form-Instance header required".to_string())
    })?;

    let current = match state.banners.get(&key).await {
        Some(banner) => banner.current(),
        None => BannerState::Idle,
    };

    Ok(Json(current))
}

fn header_instance(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORM_INSTANCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Identifies the form instance a submission belongs to.
///
/// Falls back to a hash of the email when the page did not send an instance
/// id, so raw addresses are never used as cache keys.
pub fn form_instance_key(headers: &HeaderMap, form: &ContactForm) -> String {
    if let Some(instance) = header_instance(headers) {
        return instance;
    }

    let digest = Sha256::digest(form.email.trim().to_lowercase().as_bytes());
    format!("email:{}", hex::encode(digest))
}
