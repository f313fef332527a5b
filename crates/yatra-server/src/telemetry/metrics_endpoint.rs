use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::AppState;

const METRIC_SUBSYSTEM: &str = "yatra";
const METRIC_VERSION: &str = env!("CARGO_PKG_VERSION");

fn percentile_ns(values: &[u64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut v = values.to_vec();
    v.sort_unstable();
    let idx = ((v.len() as f64 - 1.0) * pct).round() as usize;
    v[idx]
}

fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let mut body = format!(
        "yatra_registrations_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {registrations}\n\
yatra_volunteers_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {volunteers}\n\
yatra_rejections_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {rejections}\n\
yatra_slot_full_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {slot_full}\n\
yatra_store_failures_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {store_failures}\n\
yatra_capacity_fail_open_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {fail_open}\n\
yatra_notify_dispatch_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {notify_dispatch}\n\
yatra_notify_failures_total{{subsystem=\"{sub}\",version=\"{ver}\"}} {notify_failures}\n",
        sub = METRIC_SUBSYSTEM,
        ver = METRIC_VERSION,
        registrations = state.intake.registrations_total.load(Ordering::Relaxed),
        volunteers = state.intake.volunteers_total.load(Ordering::Relaxed),
        rejections = state.intake.rejections_total.load(Ordering::Relaxed),
        slot_full = state.intake.slot_full_total.load(Ordering::Relaxed),
        store_failures = state.intake.store_failures_total.load(Ordering::Relaxed),
        fail_open = state.intake.capacity_fail_open_total.load(Ordering::Relaxed),
        notify_dispatch = state.intake.notify_dispatch_total.load(Ordering::Relaxed),
        notify_failures = state.intake.notify_failures_total.load(Ordering::Relaxed),
    );

    let req_counts = state.metrics.counts.lock().await.clone();
    for ((route, status), count) in req_counts {
        body.push_str(&format!(
            "yatra_http_requests_total{{subsystem=\"{}\",version=\"{}\",route=\"{}\",status=\"{}\"}} {}\n",
            METRIC_SUBSYSTEM, METRIC_VERSION, route, status, count
        ));
    }
    let req_lat = state.metrics.latency_ns.lock().await.clone();
    for (route, vals) in req_lat {
        body.push_str(&format!(
            "yatra_http_request_latency_p95_seconds{{subsystem=\"{}\",version=\"{}\",route=\"{}\"}} {:.6}\n",
            METRIC_SUBSYSTEM,
            METRIC_VERSION,
            route,
            percentile_ns(&vals, 0.95) as f64 / 1_000_000_000.0
        ));
    }
    let store_lat = state.metrics.store_latency_ns.lock().await.clone();
    for (op, vals) in store_lat {
        body.push_str(&format!(
            "yatra_store_op_latency_p95_seconds{{subsystem=\"{}\",version=\"{}\",op=\"{}\"}} {:.6}\n",
            METRIC_SUBSYSTEM,
            METRIC_VERSION,
            op,
            percentile_ns(&vals, 0.95) as f64 / 1_000_000_000.0
        ));
    }

    let resp = (StatusCode::OK, body).into_response();
    state
        .metrics
        .observe_request("/metrics", StatusCode::OK.as_u16(), started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}
