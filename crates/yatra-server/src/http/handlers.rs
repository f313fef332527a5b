use std::fmt::Write as _;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use yatra_api::{openapi_v1_spec, ApiError, ApiErrorCode};
use yatra_model::{Slot, SlotId};

use crate::intake::{slot_occupancy, submit_intake, ParticipantIntake, SubmitError, VolunteerIntake};
use crate::notify::spawn_confirmation;
use crate::{AppState, CONFIG_SCHEMA_VERSION, CRATE_NAME};

pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    let body = Json(json!({"error": err}));
    (status, body).into_response()
}

pub(crate) fn error_json(code: ApiErrorCode, message: &str, details: Value) -> ApiError {
    ApiError {
        code,
        message: message.to_string(),
        details,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(value) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = value.trim();
        if !trimmed.is_empty() && trimmed.len() <= 128 {
            return trimmed.to_string();
        }
    }
    if let Some(value) = headers.get("traceparent").and_then(|v| v.to_str().ok()) {
        let trimmed = value.trim();
        if !trimmed.is_empty() && trimmed.len() <= 128 {
            return format!("trace-{trimmed}");
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub(crate) fn is_draining(state: &AppState) -> bool {
    !state.accepting_requests.load(Ordering::Relaxed)
}

fn if_none_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok())
        .map(std::string::ToString::to_string)
}

fn put_cache_headers(headers: &mut HeaderMap, ttl: Duration, etag: &str) {
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", ttl.as_secs())) {
        headers.insert("cache-control", value);
    }
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert("etag", value);
    }
}

fn slot_availability_entry(slot: &Slot, registered: u64) -> Value {
    let capacity = u64::from(slot.capacity);
    json!({
        "id": slot.id.as_str(),
        "label": slot.label,
        "capacity": slot.capacity,
        "registered": registered,
        "available": capacity.saturating_sub(registered),
        "full": registered >= capacity,
    })
}

fn decode_body<T>(state: &AppState, payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match payload {
        Ok(Json(draft)) => Ok(draft),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(api_error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiError::payload_too_large(state.api.max_body_bytes),
            ))
        }
        Err(rejection) => Err(api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(
                ApiErrorCode::ValidationFailed,
                "request body must be a JSON object",
                json!({"cause": rejection.body_text()}),
            ),
        )),
    }
}

fn submit_error_response(err: SubmitError) -> Response {
    match err {
        SubmitError::Rejected(field_err) => api_error_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation_failed(&field_err),
        ),
        SubmitError::SlotNotFound(slot) => {
            api_error_response(StatusCode::BAD_REQUEST, ApiError::slot_not_found(&slot))
        }
        SubmitError::SlotFull {
            slot,
            capacity,
            occupancy,
        } => api_error_response(
            StatusCode::CONFLICT,
            ApiError::slot_full(&slot, capacity, occupancy),
        ),
        SubmitError::Store(store_err) => api_error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::store_unavailable(&store_err.0),
        ),
    }
}

pub(crate) async fn landing_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let mut rows = String::new();
    for weekend in state.catalog.weekends() {
        let _ = write!(rows, "<h2>{}</h2><ul>", weekend.label);
        for slot in &weekend.slots {
            let registered = slot_occupancy(&state, &slot.id).await;
            let available = u64::from(slot.capacity).saturating_sub(registered);
            let _ = write!(
                rows,
                "<li>{} - {available} of {} spots open</li>",
                slot.label, slot.capacity
            );
        }
        rows.push_str("</ul>");
    }
    let page = format!(
        "<!DOCTYPE html><html><head><title>{name}</title></head><body>\
         <h1>{name}</h1><p>{start} to {destination}</p>{rows}\
         <p>POST /v1/registrations to register as a pilgrim, \
         POST /v1/volunteers to volunteer, \
         GET /v1/event for the full schedule.</p>\
         </body></html>",
        name = state.event.name,
        start = state.event.starting_point,
        destination = state.event.destination,
    );
    let response = Html(page).into_response();
    state
        .metrics
        .observe_request("/", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn healthz_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let response = (StatusCode::OK, "ok").into_response();
    state
        .metrics
        .observe_request("/healthz", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn readyz_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let ready = state.ready.load(Ordering::Relaxed) || !state.api.readiness_requires_store;
    let response = if ready {
        (StatusCode::OK, "ready").into_response()
    } else {
        api_error_response(StatusCode::SERVICE_UNAVAILABLE, ApiError::not_ready())
    };
    state
        .metrics
        .observe_request("/readyz", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn version_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let body = json!({
        "service": CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "config_schema_version": CONFIG_SCHEMA_VERSION,
    });
    let response = (StatusCode::OK, Json(body)).into_response();
    state
        .metrics
        .observe_request("/v1/version", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

/// Static event content with ETag revalidation; the page is immutable for a
/// season, so clients can cache it for the configured TTL.
pub(crate) async fn event_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let response = match serde_json::to_vec(state.event.as_ref()) {
        Ok(body) => {
            let etag = sha256_hex(&body);
            let mut response = if if_none_match(&headers).as_deref() == Some(etag.as_str()) {
                StatusCode::NOT_MODIFIED.into_response()
            } else {
                (
                    StatusCode::OK,
                    [("content-type", "application/json")],
                    body,
                )
                    .into_response()
            };
            put_cache_headers(response.headers_mut(), state.api.event_ttl, &etag);
            response
        }
        Err(err) => api_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::internal(&format!("event encode failed: {err}")),
        ),
    };
    state
        .metrics
        .observe_request("/v1/event", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn slots_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let mut weekends = Vec::with_capacity(state.catalog.weekends().len());
    for weekend in state.catalog.weekends() {
        let mut slots = Vec::with_capacity(weekend.slots.len());
        for slot in &weekend.slots {
            let registered = slot_occupancy(&state, &slot.id).await;
            slots.push(slot_availability_entry(slot, registered));
        }
        weekends.push(json!({"label": weekend.label, "slots": slots}));
    }
    let response = (StatusCode::OK, Json(json!({"weekends": weekends}))).into_response();
    state
        .metrics
        .observe_request("/v1/slots", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn slot_availability_handler(
    State(state): State<AppState>,
    Path(slot_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let known = match SlotId::parse(&slot_id) {
        Ok(id) => state.catalog.get(&id).cloned(),
        Err(_) => None,
    };
    let response = match known {
        Some(slot) => {
            let registered = slot_occupancy(&state, &slot.id).await;
            (StatusCode::OK, Json(slot_availability_entry(&slot, registered))).into_response()
        }
        None => api_error_response(StatusCode::NOT_FOUND, ApiError::slot_not_found(&slot_id)),
    };
    state
        .metrics
        .observe_request(
            "/v1/slots/{slot_id}/availability",
            response.status().as_u16(),
            started.elapsed(),
        )
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn register_participant_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<yatra_model::ParticipantDraft>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let response = if is_draining(&state) {
        api_error_response(StatusCode::SERVICE_UNAVAILABLE, ApiError::draining())
    } else {
        match decode_body(&state, payload) {
            Ok(draft) => match submit_intake::<ParticipantIntake>(&state, draft).await {
                Ok(record) => {
                    spawn_confirmation(&state, &record);
                    let body = json!({
                        "id": record.id,
                        "time_slot": record.participant.time_slot.as_str(),
                        "created_at": record.created_at,
                    });
                    (StatusCode::CREATED, Json(body)).into_response()
                }
                Err(err) => submit_error_response(err),
            },
            Err(response) => response,
        }
    };
    state
        .metrics
        .observe_request(
            "/v1/registrations",
            response.status().as_u16(),
            started.elapsed(),
        )
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn register_volunteer_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<yatra_model::VolunteerDraft>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let response = if is_draining(&state) {
        api_error_response(StatusCode::SERVICE_UNAVAILABLE, ApiError::draining())
    } else {
        match decode_body(&state, payload) {
            Ok(draft) => match submit_intake::<VolunteerIntake>(&state, draft).await {
                Ok(record) => {
                    let body = json!({
                        "id": record.id,
                        "created_at": record.created_at,
                    });
                    (StatusCode::CREATED, Json(body)).into_response()
                }
                Err(err) => submit_error_response(err),
            },
            Err(response) => response,
        }
    };
    state
        .metrics
        .observe_request(
            "/v1/volunteers",
            response.status().as_u16(),
            started.elapsed(),
        )
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn openapi_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let response = (StatusCode::OK, Json(openapi_v1_spec())).into_response();
    state
        .metrics
        .observe_request(
            "/v1/openapi.json",
            response.status().as_u16(),
            started.elapsed(),
        )
        .await;
    with_request_id(response, &request_id)
}

/// Raw per-slot counts with no fail-open masking. Disabled unless the
/// operator opts in.
pub(crate) async fn debug_slots_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let response = if state.api.enable_debug_endpoints {
        let mut slots = Vec::with_capacity(state.catalog.len());
        for slot in state.catalog.slots() {
            let row = match state.store.count_for_slot(&slot.id).await {
                Ok(count) => json!({"id": slot.id.as_str(), "count": count}),
                Err(err) => json!({"id": slot.id.as_str(), "error": err.0}),
            };
            slots.push(row);
        }
        (StatusCode::OK, Json(json!({"slots": slots}))).into_response()
    } else {
        api_error_response(StatusCode::NOT_FOUND, ApiError::not_found("/debug/slots"))
    };
    state
        .metrics
        .observe_request("/debug/slots", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}

pub(crate) async fn fallback_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let response = api_error_response(StatusCode::NOT_FOUND, ApiError::not_found(uri.path()));
    state
        .metrics
        .observe_request("fallback", response.status().as_u16(), started.elapsed())
        .await;
    with_request_id(response, &request_id)
}
