use crate::infra::{AppState, LandingServices};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use wdc_labs::countdown::CountdownBreakdown;
use wdc_labs::error::AppError;
use wdc_labs::sponsorship::{EmailDraft, SponsorshipDetails};
use wdc_labs::waitlist::{ApplicationFields, SubmitOutcome};

#[derive(Debug, Serialize)]
pub(crate) struct CountdownResponse {
    pub(crate) deadline: DateTime<Utc>,
    #[serde(flatten)]
    pub(crate) remaining: CountdownBreakdown,
    pub(crate) expired: bool,
    pub(crate) display: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SponsorshipLinkRequest {
    #[serde(default)]
    pub(crate) plan: Option<String>,
    #[serde(flatten)]
    pub(crate) details: SponsorshipDetails,
}

#[derive(Debug, Serialize)]
pub(crate) struct SponsorshipLinkResponse {
    pub(crate) plan: String,
    pub(crate) link: String,
    pub(crate) email: EmailDraft,
    pub(crate) mailto: String,
}

pub(crate) fn landing_router(services: Arc<LandingServices>) -> Router {
    Router::new()
        .route("/api/v1/countdown", get(countdown_endpoint))
        .route("/api/v1/waitlist", post(waitlist_endpoint))
        .route("/api/v1/sponsorship/link", post(sponsorship_link_endpoint))
        .with_state(services)
}

pub(crate) fn with_landing_routes(services: Arc<LandingServices>) -> Router {
    landing_router(services)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn countdown_endpoint(
    State(services): State<Arc<LandingServices>>,
) -> Json<CountdownResponse> {
    let remaining = CountdownBreakdown::until(services.deadline, services.time.now());
    Json(CountdownResponse {
        deadline: services.deadline,
        remaining,
        expired: remaining.is_expired(),
        display: remaining.to_string(),
    })
}

pub(crate) async fn waitlist_endpoint(
    State(services): State<Arc<LandingServices>>,
    Json(fields): Json<ApplicationFields>,
) -> Response {
    let controller = services.controller();
    if let Err(err) = controller.fill(fields) {
        return AppError::from(err).into_response();
    }

    let dismiss_after_ms = u64::try_from(services.success_dismiss.as_millis()).unwrap_or(u64::MAX);
    match controller.submit().await {
        SubmitOutcome::Succeeded => (
            StatusCode::CREATED,
            Json(json!({
                "status": controller.phase().label(),
                "dismiss_after_ms": dismiss_after_ms,
            })),
        )
            .into_response(),
        SubmitOutcome::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": errors.to_string(),
                "invalid_fields": errors.names(),
            })),
        )
            .into_response(),
        SubmitOutcome::Failed(err) => AppError::from(err).into_response(),
        other => {
            warn!(?other, "fresh controller did not process the submission");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "submission was not processed" })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn sponsorship_link_endpoint(
    State(services): State<Arc<LandingServices>>,
    Json(payload): Json<SponsorshipLinkRequest>,
) -> Result<Json<SponsorshipLinkResponse>, AppError> {
    let SponsorshipLinkRequest { plan, details } = payload;

    let mut request = services.sponsorship(plan.as_deref());
    request.set_details(details);
    let link = request.generate_link()?;
    let email = request.email_draft();

    Ok(Json(SponsorshipLinkResponse {
        plan: request.plan().to_string(),
        link,
        mailto: email.mailto_url(),
        email,
    }))
}
