//! Registration service for the Kanwariya Yatra pilgrimage.
//!
//! An axum router over a [`RegistrationStore`]: participant and volunteer
//! drafts are validated against the domain model, checked against slot
//! capacity, persisted, and acknowledged. The capacity check is advisory;
//! see [`intake`] for the exact semantics.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Mutex;
use yatra_model::{
    EventInfo, Participant, ParticipantRecord, SlotCatalog, SlotId, Volunteer, VolunteerRecord,
};

pub mod config;
pub(crate) mod http;
pub mod intake;
pub(crate) mod middleware;
pub(crate) mod notify;
pub(crate) mod store;
pub(crate) mod telemetry;

pub use config::{validate_startup_config_contract, ApiConfig, CONFIG_SCHEMA_VERSION};
pub use notify::RetryPolicy;

pub const CRATE_NAME: &str = "yatra-server";

/// Store-layer failure with a human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Durable registration storage. Both tables are append-only: inserts assign
/// a fresh id and nothing ever updates or deletes a row.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn insert_participant(
        &self,
        participant: &Participant,
    ) -> Result<ParticipantRecord, StoreError>;
    async fn insert_volunteer(&self, volunteer: &Volunteer)
        -> Result<VolunteerRecord, StoreError>;
    /// Stored participant registrations for one slot.
    async fn count_for_slot(&self, slot: &SlotId) -> Result<u64, StoreError>;
    /// Cheap probe used by startup and readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Intake pipeline counters, exported on `/metrics`.
#[derive(Debug, Default)]
pub struct IntakeMetrics {
    pub registrations_total: AtomicU64,
    pub volunteers_total: AtomicU64,
    pub rejections_total: AtomicU64,
    pub slot_full_total: AtomicU64,
    pub store_failures_total: AtomicU64,
    pub capacity_fail_open_total: AtomicU64,
    pub notify_dispatch_total: AtomicU64,
    pub notify_failures_total: AtomicU64,
}

#[derive(Default)]
pub(crate) struct RequestMetrics {
    pub(crate) counts: Mutex<HashMap<(String, u16), u64>>,
    pub(crate) latency_ns: Mutex<HashMap<String, Vec<u64>>>,
    pub(crate) store_latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub(crate) async fn observe_request(&self, route: &str, status: u16, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts.entry((route.to_string(), status)).or_insert(0) += 1;
        drop(counts);
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        let mut latencies = self.latency_ns.lock().await;
        latencies.entry(route.to_string()).or_default().push(nanos);
    }

    pub(crate) async fn observe_store_op(&self, op: &str, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        let mut latencies = self.store_latency_ns.lock().await;
        latencies.entry(op.to_string()).or_default().push(nanos);
    }
}

/// Shared service state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RegistrationStore>,
    pub catalog: Arc<SlotCatalog>,
    pub event: Arc<EventInfo>,
    pub api: ApiConfig,
    pub ready: Arc<AtomicBool>,
    pub accepting_requests: Arc<AtomicBool>,
    pub intake: Arc<IntakeMetrics>,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
    pub(crate) notify: Option<Arc<notify::NotifyClient>>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self::with_config(store, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(store: Arc<dyn RegistrationStore>, api: ApiConfig) -> Self {
        let notify = notify::NotifyClient::from_config(&api).map(Arc::new);
        Self {
            store,
            catalog: Arc::new(SlotCatalog::yatra_2025(api.slot_capacity)),
            event: Arc::new(EventInfo::kanwariya_2025()),
            api,
            ready: Arc::new(AtomicBool::new(true)),
            accepting_requests: Arc::new(AtomicBool::new(true)),
            intake: Arc::new(IntakeMetrics::default()),
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            notify,
        }
    }

    pub(crate) fn rules(&self) -> intake::IntakeRules {
        intake::IntakeRules {
            age: self.api.age_bounds,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::landing_handler))
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(telemetry::metrics_endpoint::metrics_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route("/v1/event", get(http::handlers::event_handler))
        .route("/v1/slots", get(http::handlers::slots_handler))
        .route(
            "/v1/slots/{slot_id}/availability",
            get(http::handlers::slot_availability_handler),
        )
        .route(
            "/v1/registrations",
            post(http::handlers::register_participant_handler),
        )
        .route(
            "/v1/volunteers",
            post(http::handlers::register_volunteer_handler),
        )
        .route("/v1/openapi.json", get(http::handlers::openapi_handler))
        .route("/debug/slots", get(http::handlers::debug_slots_handler))
        .fallback(http::handlers::fallback_handler)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}

pub use store::fake::FakeStore;
pub use store::sqlite::SqliteStore;

#[cfg(test)]
mod intake_tests;
