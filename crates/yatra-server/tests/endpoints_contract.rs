use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use yatra_server::{build_router, ApiConfig, AppState, FakeStore};

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    extra_headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (name, value) in extra_headers {
        req.push_str(&format!("{name}: {value}\r\n"));
    }
    if let Some(body) = body {
        req.push_str(&format!(
            "content-type: application/json\r\ncontent-length: {}\r\n\r\n{body}",
            body.len()
        ));
    } else {
        req.push_str("\r\n");
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

async fn serve(state: AppState) -> std::net::SocketAddr {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    let prefix = format!("{name}: ");
    head.lines().find_map(|line| line.strip_prefix(&prefix))
}

fn pilgrim_payload() -> String {
    json!({
        "full_name": "Asha Rao",
        "phone": "9999999999",
        "age": 30,
        "gender": "female",
        "address": "Bangalore",
        "emergency_contact": "8888888888",
        "agreedToTerms": true,
        "timeSlot": "2025-07-26",
    })
    .to_string()
}

#[tokio::test]
async fn operational_endpoints_report_service_health() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::new(store);
    let ready = state.ready.clone();
    let addr = serve(state).await;

    let (status, _, body) = send_raw(addr, "GET", "/healthz", &[], None).await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");

    let (status, _, body) = send_raw(addr, "GET", "/readyz", &[], None).await;
    assert_eq!(status, 200);
    assert_eq!(body, "ready");

    ready.store(false, Ordering::Relaxed);
    let (status, _, body) = send_raw(addr, "GET", "/readyz", &[], None).await;
    assert_eq!(status, 503);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "NotReady");
    ready.store(true, Ordering::Relaxed);

    let (status, _, body) = send_raw(addr, "GET", "/v1/version", &[], None).await;
    assert_eq!(status, 200);
    let version: Value = serde_json::from_str(&body).expect("version json");
    assert_eq!(version["service"], "yatra-server");
    assert_eq!(version["api_version"], "v1");
    assert_eq!(version["config_schema_version"], "1");

    let (status, _, body) = send_raw(addr, "GET", "/metrics", &[], None).await;
    assert_eq!(status, 200);
    assert!(body.contains("yatra_registrations_total{subsystem=\"yatra\""));
    assert!(body.contains("yatra_http_requests_total{"));
    assert!(body.contains("route=\"/healthz\""));
    assert!(body.contains("yatra_http_request_latency_p95_seconds"));
}

#[tokio::test]
async fn request_ids_propagate_from_the_caller() {
    let state = AppState::new(Arc::new(FakeStore::default()));
    let addr = serve(state).await;

    let (status, head, _) = send_raw(
        addr,
        "GET",
        "/healthz",
        &[("x-request-id", "req-caller-42")],
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(header_value(&head, "x-request-id"), Some("req-caller-42"));

    let (status, head, _) = send_raw(addr, "GET", "/healthz", &[], None).await;
    assert_eq!(status, 200);
    let minted = header_value(&head, "x-request-id").expect("minted request id");
    assert!(minted.starts_with("req-"), "minted id: {minted}");
}

#[tokio::test]
async fn event_endpoint_honors_etag_revalidation() {
    let state = AppState::new(Arc::new(FakeStore::default()));
    let addr = serve(state).await;

    let (status, head, body) = send_raw(addr, "GET", "/v1/event", &[], None).await;
    assert_eq!(status, 200);
    assert_eq!(
        header_value(&head, "cache-control"),
        Some("public, max-age=300")
    );
    let etag = header_value(&head, "etag").expect("etag header").to_string();
    let event: Value = serde_json::from_str(&body).expect("event json");
    assert_eq!(event["name"], "Kanwariya Yatra 2025");
    assert_eq!(event["starting_point"], "Narayanhalli Cross");
    assert!(event["schedule"].is_array());

    let (status, head, body) = send_raw(
        addr,
        "GET",
        "/v1/event",
        &[("if-none-match", etag.as_str())],
        None,
    )
    .await;
    assert_eq!(status, 304);
    assert!(body.is_empty(), "304 must carry no body, got: {body}");
    assert_eq!(header_value(&head, "etag"), Some(etag.as_str()));

    let (status, _, _) = send_raw(
        addr,
        "GET",
        "/v1/event",
        &[("if-none-match", "stale-etag")],
        None,
    )
    .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn slots_listing_groups_weekends_and_flags_full_dates() {
    let store = Arc::new(FakeStore::default());
    *store.fixed_count.lock().await = Some(200);
    let state = AppState::new(store);
    let addr = serve(state).await;

    let (status, _, body) = send_raw(addr, "GET", "/v1/slots", &[], None).await;
    assert_eq!(status, 200);
    let listing: Value = serde_json::from_str(&body).expect("slots json");
    let weekends = listing["weekends"].as_array().expect("weekends array");
    assert_eq!(weekends.len(), 5);
    let total_slots: usize = weekends
        .iter()
        .map(|w| w["slots"].as_array().map_or(0, Vec::len))
        .sum();
    assert_eq!(total_slots, 15);
    assert_eq!(weekends[0]["label"], "July 26-28");
    for weekend in weekends {
        for slot in weekend["slots"].as_array().expect("slots array") {
            assert_eq!(slot["full"], true);
            assert_eq!(slot["available"], 0);
        }
    }
}

#[tokio::test]
async fn unknown_slot_availability_is_a_404() {
    let state = AppState::new(Arc::new(FakeStore::default()));
    let addr = serve(state).await;

    let (status, _, body) =
        send_raw(addr, "GET", "/v1/slots/2025-12-25/availability", &[], None).await;
    assert_eq!(status, 404);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "SlotNotFound");
    assert_eq!(err["error"]["details"]["slot"], "2025-12-25");

    let (status, _, body) = send_raw(addr, "GET", "/v1/slots/garbage/availability", &[], None).await;
    assert_eq!(status, 404);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "SlotNotFound");
}

#[tokio::test]
async fn draining_rejects_new_submissions() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::new(store.clone());
    let accepting = state.accepting_requests.clone();
    let addr = serve(state).await;

    accepting.store(false, Ordering::Relaxed);
    let (status, _, body) = send_raw(
        addr,
        "POST",
        "/v1/registrations",
        &[],
        Some(&pilgrim_payload()),
    )
    .await;
    assert_eq!(status, 503);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "ServiceDraining");
    assert_eq!(err["error"]["details"]["retryable"], true);
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 0);

    // Liveness stays green while submissions drain.
    let (status, _, _) = send_raw(addr, "GET", "/healthz", &[], None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn unknown_routes_fall_back_to_a_json_404() {
    let state = AppState::new(Arc::new(FakeStore::default()));
    let addr = serve(state).await;

    let (status, _, body) = send_raw(addr, "GET", "/v1/pilgrims", &[], None).await;
    assert_eq!(status, 404);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "NotFound");
    assert_eq!(err["error"]["details"]["path"], "/v1/pilgrims");
}

#[tokio::test]
async fn debug_slots_is_gated_by_config() {
    let state = AppState::new(Arc::new(FakeStore::default()));
    let addr = serve(state).await;
    let (status, _, _) = send_raw(addr, "GET", "/debug/slots", &[], None).await;
    assert_eq!(status, 404);

    let state = AppState::with_config(
        Arc::new(FakeStore::default()),
        ApiConfig {
            enable_debug_endpoints: true,
            ..ApiConfig::default()
        },
    );
    let addr = serve(state).await;
    let (status, _, body) = send_raw(addr, "GET", "/debug/slots", &[], None).await;
    assert_eq!(status, 200);
    let debug: Value = serde_json::from_str(&body).expect("debug json");
    let slots = debug["slots"].as_array().expect("slots array");
    assert_eq!(slots.len(), 15);
    assert_eq!(slots[0]["count"], 0);
}

#[tokio::test]
async fn oversized_bodies_are_rejected_with_413() {
    let state = AppState::with_config(
        Arc::new(FakeStore::default()),
        ApiConfig {
            max_body_bytes: 1024,
            ..ApiConfig::default()
        },
    );
    let addr = serve(state).await;

    let oversized = format!(
        "{{\"full_name\": \"{}\"}}",
        "a".repeat(4 * 1024)
    );
    let (status, _, body) = send_raw(addr, "POST", "/v1/registrations", &[], Some(&oversized)).await;
    assert_eq!(status, 413);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "PayloadTooLarge");
    assert_eq!(err["error"]["details"]["limit_bytes"], 1024);
}

#[tokio::test]
async fn store_outage_returns_503_with_a_retryable_error() {
    let store = Arc::new(FakeStore::default());
    store.fail_insert.store(true, Ordering::Relaxed);
    let state = AppState::new(store);
    let addr = serve(state).await;

    let (status, _, body) = send_raw(
        addr,
        "POST",
        "/v1/registrations",
        &[],
        Some(&pilgrim_payload()),
    )
    .await;
    assert_eq!(status, 503);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "StoreUnavailable");
    assert_eq!(err["error"]["details"]["retryable"], true);
}
