use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{instrument, warn};
use yatra_model::ParticipantRecord;

use crate::config::ApiConfig;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notify error: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Client for the confirmation-email unit. Delivery is best effort: the
/// registration is already durable by the time this runs, so failures are
/// logged and counted, never surfaced to the submitter.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl NotifyClient {
    pub(crate) fn from_config(api: &ApiConfig) -> Option<Self> {
        let url = api.notify_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        Some(Self {
            url: url.to_string(),
            timeout: api.notify_timeout,
            retry: api.notify_retry.clone(),
        })
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    /// Confirmation payload for one stored registration, or `None` when the
    /// pilgrim left no email address.
    pub(crate) fn confirmation_payload(record: &ParticipantRecord) -> Option<Value> {
        let email = record.participant.email.as_ref()?;
        Some(json!({
            "full_name": record.participant.full_name.as_str(),
            "email": email.as_str(),
            "phone": record.participant.phone.as_str(),
            "age": record.participant.age,
            "gender": record.participant.gender.as_str(),
            "address": record.participant.address,
            "emergency_contact": record.participant.emergency_contact.as_str(),
            "medical_conditions": record.participant.medical_conditions,
            "selected_date": record.participant.time_slot.as_str(),
        }))
    }

    #[instrument(name = "notify.send_confirmation", skip(self, payload))]
    pub(crate) async fn send_confirmation(&self, payload: &Value) -> Result<(), NotifyError> {
        let client = self.client();
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match client.post(&self.url).json(payload).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts as u64 {
                        return Err(NotifyError(format!(
                            "confirmation endpoint returned {}",
                            resp.status()
                        )));
                    }
                }
                Err(err) => {
                    if attempt >= self.retry.max_attempts as u64 {
                        return Err(NotifyError(format!("confirmation request failed: {err}")));
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.retry.base_backoff_ms.saturating_mul(attempt),
            ))
            .await;
        }
    }
}

/// Fire-and-forget dispatch of the confirmation email for a stored
/// registration. No-op when no notify endpoint is configured or the record
/// carries no email address.
pub(crate) fn spawn_confirmation(state: &AppState, record: &ParticipantRecord) {
    let Some(client) = state.notify.clone() else {
        return;
    };
    let Some(payload) = NotifyClient::confirmation_payload(record) else {
        return;
    };
    let intake = Arc::clone(&state.intake);
    let registration = record.id;
    tokio::spawn(async move {
        intake.notify_dispatch_total.fetch_add(1, Ordering::Relaxed);
        if let Err(err) = client.send_confirmation(&payload).await {
            intake.notify_failures_total.fetch_add(1, Ordering::Relaxed);
            warn!(registration = %registration, "confirmation email not delivered: {err}");
        }
    });
}
