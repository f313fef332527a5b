//! Confirmation-email dispatcher for the Kanwariya Yatra registration
//! service. Runs as its own deployable unit; the registration server posts
//! confirmed participants here and never waits on the outcome, so a mail
//! outage stays contained in this process.

#![forbid(unsafe_code)]

pub mod mailer;
pub mod template;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, Instrument};

use crate::mailer::{Mailer, OutboundEmail};
use crate::template::{render_confirmation_html, CONFIRMATION_SUBJECT, DEFAULT_FROM};

/// Wire payload for `POST /send-confirmation-email`, matching what the
/// registration server emits for a confirmed participant.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub age: u8,
    pub gender: String,
    pub address: String,
    pub emergency_contact: String,
    #[serde(default)]
    pub medical_conditions: Option<String>,
    pub selected_date: String,
}

#[derive(Clone)]
pub struct NotifyState {
    pub mailer: Arc<dyn Mailer>,
    pub from: String,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl NotifyState {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self::with_sender(mailer, DEFAULT_FROM)
    }

    pub fn with_sender(mailer: Arc<dyn Mailer>, from: &str) -> Self {
        Self {
            mailer,
            from: from.to_string(),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

fn make_request_id(state: &NotifyState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

fn propagated_request_id(headers: &HeaderMap, state: &NotifyState) -> String {
    if let Some(value) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = value.trim();
        if !trimmed.is_empty() && trimmed.len() <= 128 {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

/// Wraps every request in an `http.request` span and echoes the request id,
/// honoring an id forwarded by the registration server.
async fn request_tracing_middleware(
    State(state): State<NotifyState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let route = request.uri().path().to_string();
    let request_id = propagated_request_id(request.headers(), &state);
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );
    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

async fn send_confirmation_handler(
    State(state): State<NotifyState>,
    payload: Result<Json<ConfirmationRequest>, JsonRejection>,
) -> Response {
    // Any failure, a bad payload included, renders as the flat 500 envelope
    // the registration form expects from this endpoint.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": rejection.body_text()})),
            )
                .into_response();
        }
    };
    let email = OutboundEmail {
        from: state.from.clone(),
        to: request.email.clone(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        html: render_confirmation_html(&request),
    };
    match state.mailer.send(&email).await {
        Ok(receipt) => {
            info!(receipt = %receipt.id, "confirmation email sent");
            (
                StatusCode::OK,
                Json(json!({"success": true, "data": receipt})),
            )
                .into_response()
        }
        Err(err) => {
            error!("confirmation email failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.0})),
            )
                .into_response()
        }
    }
}

async fn healthz_handler() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn fallback_handler(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("no route for {}", uri.path())})),
    )
        .into_response()
}

/// The registration form on the public site calls this unit directly, so
/// the CORS surface is wide open by contract.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

pub fn build_router(state: NotifyState) -> Router {
    Router::new()
        .route("/send-confirmation-email", post(send_confirmation_handler))
        .route("/healthz", get(healthz_handler))
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            request_tracing_middleware,
        ))
        .layer(cors_layer())
        .with_state(state)
}
