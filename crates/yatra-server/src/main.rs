#![forbid(unsafe_code)]

use std::env;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use opentelemetry::trace::TracerProvider as _;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yatra_model::AgeBounds;
use yatra_server::{
    build_router, validate_startup_config_contract, ApiConfig, AppState, RegistrationStore,
    RetryPolicy, SqliteStore,
};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u8(name: &str, default: u8) -> u8 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_json = env_bool("YATRA_LOG_JSON", true);
    if env_bool("YATRA_OTEL_ENABLED", false) {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .build()
            .expect("otlp exporter");
        let tracer = opentelemetry_sdk::trace::TracerProvider::builder()
            .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
            .build()
            .tracer("yatra-server");
        if log_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
        }
    } else if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("YATRA_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let db_path = env::var("YATRA_DB_PATH").unwrap_or_else(|_| "artifacts/yatra.sqlite".to_string());

    let defaults = ApiConfig::default();
    let api_cfg = ApiConfig {
        max_body_bytes: env_usize("YATRA_MAX_BODY_BYTES", defaults.max_body_bytes),
        request_timeout: env_duration_ms("YATRA_REQUEST_TIMEOUT_MS", 5000),
        slot_capacity: env_u32("YATRA_SLOT_CAPACITY", defaults.slot_capacity),
        age_bounds: AgeBounds {
            min: env_u8("YATRA_AGE_MIN", defaults.age_bounds.min),
            max: env_u8("YATRA_AGE_MAX", defaults.age_bounds.max),
        },
        event_ttl: env_duration_ms("YATRA_EVENT_TTL_MS", 300_000),
        readiness_requires_store: env_bool("YATRA_READINESS_REQUIRES_STORE", true),
        enable_debug_endpoints: env_bool("YATRA_ENABLE_DEBUG_ENDPOINTS", false),
        notify_url: env::var("YATRA_NOTIFY_URL").ok().filter(|v| !v.trim().is_empty()),
        notify_timeout: env_duration_ms("YATRA_NOTIFY_TIMEOUT_MS", 5000),
        notify_retry: RetryPolicy {
            max_attempts: env_usize("YATRA_NOTIFY_RETRY_ATTEMPTS", 4),
            base_backoff_ms: env_u64("YATRA_NOTIFY_RETRY_BASE_MS", 120),
        },
    };
    validate_startup_config_contract(&api_cfg, &db_path)?;

    let store: Arc<dyn RegistrationStore> = Arc::new(
        SqliteStore::open(Path::new(&db_path))
            .map_err(|e| format!("open registration store: {e}"))?,
    );
    let state = AppState::with_config(store, api_cfg);
    let app = build_router(state.clone());

    match state.store.ping().await {
        Ok(()) => state.ready.store(true, Ordering::Relaxed),
        Err(e) => {
            state.ready.store(false, Ordering::Relaxed);
            warn!("store ping failed at startup: {e}");
        }
    }

    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {bind_addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket
        .set_keepalive(env_bool("YATRA_TCP_KEEPALIVE_ENABLED", true))
        .map_err(|e| format!("set_keepalive failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("yatra-server listening on {bind_addr}");
    let accepting = state.accepting_requests.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            accepting.store(false, Ordering::Relaxed);
            // Refuse new submissions first, then drain whatever is in flight.
            let drain_ms = env_u64("YATRA_SHUTDOWN_DRAIN_MS", 5000);
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
