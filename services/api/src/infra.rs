use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wdc_labs::config::{parse_deadline, AppConfig, StoreConfig};
use wdc_labs::countdown::{SystemTimeSource, TimeSource};
use wdc_labs::error::AppError;
use wdc_labs::sponsorship::SponsorshipRequest;
use wdc_labs::waitlist::{InMemoryRecordStore, RecordStore, RestRecordStore, SubmissionController};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the landing endpoints need, shared across requests.
#[derive(Clone)]
pub(crate) struct LandingServices {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) collection: String,
    pub(crate) deadline: DateTime<Utc>,
    pub(crate) time: Arc<dyn TimeSource>,
    pub(crate) sponsor_base_url: String,
    /// How long a client shows the success screen before returning to the form.
    pub(crate) success_dismiss: Duration,
}

impl LandingServices {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            store: build_store(&config.store)?,
            collection: config.store.collection.clone(),
            deadline: config.landing.countdown_deadline,
            time: Arc::new(SystemTimeSource),
            sponsor_base_url: config.landing.sponsor_base_url.clone(),
            success_dismiss: config.landing.success_dismiss,
        })
    }

    /// A fresh controller per applicant; controllers are never shared.
    pub(crate) fn controller(&self) -> SubmissionController {
        SubmissionController::new(self.store.clone(), self.collection.clone())
    }

    pub(crate) fn sponsorship(&self, plan: Option<&str>) -> SponsorshipRequest {
        SponsorshipRequest::with_base_url(self.sponsor_base_url.clone(), plan)
    }
}

pub(crate) fn build_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, AppError> {
    match config.remote() {
        Some((url, key)) => {
            info!(%url, collection = %config.collection, "using hosted waitlist store");
            Ok(Arc::new(RestRecordStore::new(url, key, config.timeout)?))
        }
        None => {
            info!("no hosted store configured; keeping waitlist records in memory");
            Ok(Arc::new(InMemoryRecordStore::default()))
        }
    }
}

pub(crate) fn parse_deadline_arg(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_deadline(raw).map_err(|err| err.to_string())
}
