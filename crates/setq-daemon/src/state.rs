//! Shared runtime state for setq-daemon.
//!
//! All types here are `Clone`-able (via `Arc` or copy). Handlers receive
//! `State<Arc<AppState>>` from Axum; this module owns nothing async itself
//! apart from the heartbeat task.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use setq_core::{Orchestrator, Outcome, Snapshot};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    /// A new snapshot was committed by a live request.
    Snapshot(Snapshot),
    LogLine { level: String, msg: String },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// Fetch-or-freeze decision plus the snapshot store it owns.
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        Self {
            bus,
            build: BuildInfo {
                service: "setq-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            orchestrator,
        }
    }

    /// Serve one market-data request and announce fresh commits on the bus.
    pub async fn serve_current(&self) -> Outcome {
        let outcome = self.orchestrator.current().await;
        // Send errors only mean there are no subscribers.
        match &outcome {
            Outcome::Live { snapshot, .. } => {
                let _ = self.bus.send(BusMsg::Snapshot(snapshot.clone()));
            }
            Outcome::Frozen { session, reason, .. } if session.is_open() => {
                let _ = self.bus.send(BusMsg::LogLine {
                    level: "WARN".to_string(),
                    msg: format!("{session} session open but serving frozen snapshot ({reason})"),
                });
            }
            Outcome::Unavailable { session } => {
                let _ = self.bus.send(BusMsg::LogLine {
                    level: "ERROR".to_string(),
                    msg: format!(
                        "{session} session open, upstream failed, no snapshot committed yet"
                    ),
                });
            }
            _ => {}
        }
        outcome
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
