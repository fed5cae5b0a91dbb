//! Axum router and all HTTP handlers for setq-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  All handlers are `pub(crate)` so the scenario tests in
//! `tests/` compose the router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use setq_core::{Outcome, OutcomeKind};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::{
    api_types::{
        no_data_message, HealthResponse, LegacyErrorResponse, LegacySetDataResponse,
        MarketResponse,
    },
    state::{uptime_secs, AppState, BusMsg},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/market", get(market))
        .route("/v1/stream", get(stream))
        .route("/get_set_data", get(legacy_set_data))
        .route("/api/set-data", get(legacy_set_data))
        .with_state(state)
}

/// HTTP status for each outcome kind. The two "no value" kinds never share
/// a status with a served snapshot.
pub fn status_for(kind: OutcomeKind) -> StatusCode {
    match kind {
        OutcomeKind::Live | OutcomeKind::Frozen => StatusCode::OK,
        OutcomeKind::NoDataYet => StatusCode::NOT_FOUND,
        OutcomeKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
            uptime_secs: uptime_secs(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/market
// ---------------------------------------------------------------------------

pub(crate) async fn market(State(st): State<Arc<AppState>>) -> Response {
    let outcome = st.serve_current().await;
    let status = status_for(outcome.kind());
    (status, Json(MarketResponse::from(outcome))).into_response()
}

// ---------------------------------------------------------------------------
// GET /get_set_data  GET /api/set-data
// ---------------------------------------------------------------------------

pub(crate) async fn legacy_set_data(State(st): State<Arc<AppState>>) -> Response {
    let outcome = st.serve_current().await;
    let kind = outcome.kind();
    let session = outcome.session();
    let status = status_for(kind);

    match &outcome {
        Outcome::Live { snapshot, .. } | Outcome::Frozen { snapshot, .. } => (
            status,
            Json(LegacySetDataResponse::from_snapshot(kind, session, snapshot)),
        )
            .into_response(),
        Outcome::NoDataYet { .. } | Outcome::Unavailable { .. } => (
            status,
            Json(LegacyErrorResponse {
                error: no_data_message(kind).unwrap_or_default().to_string(),
                kind,
                session,
            }),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::Snapshot(_) => "snapshot",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
