use serde::Serialize;
use std::time::Duration;
use yatra_model::{AgeBounds, DEFAULT_SLOT_CAPACITY};

use crate::notify::RetryPolicy;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub slot_capacity: u32,
    pub age_bounds: AgeBounds,
    pub event_ttl: Duration,
    pub readiness_requires_store: bool,
    pub enable_debug_endpoints: bool,
    pub notify_url: Option<String>,
    pub notify_timeout: Duration,
    pub notify_retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(5),
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            age_bounds: AgeBounds::default(),
            event_ttl: Duration::from_secs(300),
            readiness_requires_store: true,
            enable_debug_endpoints: false,
            notify_url: None,
            notify_timeout: Duration::from_secs(5),
            notify_retry: RetryPolicy::default(),
        }
    }
}

pub fn validate_startup_config_contract(api: &ApiConfig, db_path: &str) -> Result<(), String> {
    if api.max_body_bytes < 1024 {
        return Err("max_body_bytes must be at least 1024".to_string());
    }
    if api.request_timeout.is_zero() || api.notify_timeout.is_zero() {
        return Err("timeouts must be > 0".to_string());
    }
    if api.slot_capacity == 0 {
        return Err("slot_capacity must be > 0".to_string());
    }
    if api.age_bounds.min == 0 || api.age_bounds.min > api.age_bounds.max {
        return Err("age bounds contract requires 1 <= min <= max".to_string());
    }
    if db_path.trim().is_empty() {
        return Err("db path must not be empty".to_string());
    }
    if let Some(url) = api.notify_url.as_deref() {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("notify_url must use http or https".to_string());
        }
    }
    if api.notify_retry.max_attempts == 0 {
        return Err("notify retry must allow at least one attempt".to_string());
    }
    Ok(())
}
