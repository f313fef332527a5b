#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use opentelemetry::trace::TracerProvider as _;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yatra_notify::mailer::{FakeMailer, Mailer, ResendMailer, RetryPolicy};
use yatra_notify::template::DEFAULT_FROM;
use yatra_notify::{build_router, NotifyState};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

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
    let log_json = env_bool("NOTIFY_LOG_JSON", true);
    if env_bool("NOTIFY_OTEL_ENABLED", false) {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .build()
            .expect("otlp exporter");
        let tracer = opentelemetry_sdk::trace::TracerProvider::builder()
            .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
            .build()
            .tracer("yatra-notify");
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
    let bind_addr = env::var("NOTIFY_BIND").unwrap_or_else(|_| "0.0.0.0:8090".to_string());
    let from = env::var("NOTIFY_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string());

    let mailer: Arc<dyn Mailer> = if env_bool("NOTIFY_DRY_RUN", false) {
        info!("dry run enabled, mail will be recorded instead of sent");
        Arc::new(FakeMailer::default())
    } else {
        let api_key = env::var("NOTIFY_RESEND_API_KEY")
            .map_err(|_| "NOTIFY_RESEND_API_KEY must be set".to_string())?;
        if api_key.trim().is_empty() {
            return Err("NOTIFY_RESEND_API_KEY must not be blank".to_string());
        }
        let endpoint =
            env::var("NOTIFY_RESEND_ENDPOINT").unwrap_or_else(|_| RESEND_ENDPOINT.to_string());
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err("NOTIFY_RESEND_ENDPOINT must use http or https".to_string());
        }
        let retry = RetryPolicy {
            max_attempts: env_usize("NOTIFY_RETRY_ATTEMPTS", 4),
            base_backoff_ms: env_u64("NOTIFY_RETRY_BASE_MS", 120),
        };
        if retry.max_attempts == 0 {
            return Err("notify retry must allow at least one attempt".to_string());
        }
        Arc::new(ResendMailer::new(
            &endpoint,
            &api_key,
            env_duration_ms("NOTIFY_MAILER_TIMEOUT_MS", 10_000),
            retry,
        ))
    };

    let state = NotifyState::with_sender(mailer, &from);
    let app = build_router(state);

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
        .set_keepalive(env_bool("NOTIFY_TCP_KEEPALIVE_ENABLED", true))
        .map_err(|e| format!("set_keepalive failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("yatra-notify listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            let drain_ms = env_u64("NOTIFY_SHUTDOWN_DRAIN_MS", 5000);
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
