use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{instrument, warn};

#[derive(Debug, Clone)]
pub struct MailError(pub String);

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mail error: {}", self.0)
    }
}

impl Error for MailError {}

/// One outbound message, fully rendered. The mailer only transports it.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailReceipt {
    pub id: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<MailReceipt, MailError>;
}

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

/// Delivers through the Resend HTTP API. The endpoint is overridable so
/// tests can point it at a local listener.
pub struct ResendMailer {
    endpoint: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ResendMailer {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            timeout,
            retry,
        }
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    #[instrument(name = "mailer.send", skip(self, email))]
    async fn send(&self, email: &OutboundEmail) -> Result<MailReceipt, MailError> {
        let client = self.client();
        let body = json!({
            "from": email.from,
            "to": [email.to],
            "subject": email.subject,
            "html": email.html,
        });
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            let sent = client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;
            match sent {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<MailReceipt>()
                        .await
                        .map_err(|err| MailError(format!("receipt decode failed: {err}")));
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    let snippet: String = text.chars().take(200).collect();
                    if attempt >= self.retry.max_attempts as u64 {
                        return Err(MailError(format!("mailer returned {status}: {snippet}")));
                    }
                    warn!(attempt, "mailer returned {status}, retrying");
                }
                Err(err) => {
                    if attempt >= self.retry.max_attempts as u64 {
                        return Err(MailError(format!("mailer request failed: {err}")));
                    }
                    warn!(attempt, "mailer request failed, retrying: {err}");
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.retry.base_backoff_ms.saturating_mul(attempt),
            ))
            .await;
        }
    }
}

/// Records mail instead of sending it. Backs both the test suite and the
/// `NOTIFY_DRY_RUN` deployment mode.
#[derive(Debug, Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail_send: AtomicBool,
    receipt_seed: AtomicU64,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<MailReceipt, MailError> {
        if self.fail_send.load(Ordering::Relaxed) {
            return Err(MailError("fake mailer failure".to_string()));
        }
        self.sent.lock().await.push(email.clone());
        let id = self.receipt_seed.fetch_add(1, Ordering::Relaxed);
        Ok(MailReceipt {
            id: format!("fake-{id:04x}"),
        })
    }
}
