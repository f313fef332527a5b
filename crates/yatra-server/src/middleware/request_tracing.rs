use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::http::handlers::propagated_request_id;
use crate::AppState;

/// Wraps every request in an `http.request` span. The resolved request id is
/// pinned onto the incoming headers so handlers echo the same id back.
pub(crate) async fn request_tracing_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let route = request.uri().path().to_string();
    let request_id = propagated_request_id(request.headers(), &state);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert("x-request-id", value);
    }
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );
    next.run(request).instrument(span).await
}
