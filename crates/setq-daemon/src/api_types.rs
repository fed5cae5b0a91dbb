//! Request and response types for all setq-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests.  No business logic lives here.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use setq_core::{FreezeReason, Outcome, OutcomeKind, Session, Snapshot};

pub const NO_DATA_YET_MESSAGE: &str = "no official data yet";
pub const UNAVAILABLE_MESSAGE: &str = "market data temporarily unavailable";

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

// ---------------------------------------------------------------------------
// /v1/market
// ---------------------------------------------------------------------------

/// Structured market response.
///
/// `session` is the classification at request time; `data.session` and
/// `data.captured_at` describe the snapshot actually returned, so a client
/// can tell a live reading from a held-over one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketResponse {
    pub kind: OutcomeKind,
    pub session: Session,
    pub frozen_reason: Option<FreezeReason>,
    pub data: Option<Snapshot>,
    pub message: Option<String>,
}

impl From<Outcome> for MarketResponse {
    fn from(outcome: Outcome) -> Self {
        let kind = outcome.kind();
        let session = outcome.session();
        let frozen_reason = outcome.freeze_reason();
        let message = no_data_message(kind).map(str::to_string);
        let data = match outcome {
            Outcome::Live { snapshot, .. } | Outcome::Frozen { snapshot, .. } => Some(snapshot),
            Outcome::NoDataYet { .. } | Outcome::Unavailable { .. } => None,
        };
        Self {
            kind,
            session,
            frozen_reason,
            data,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// /get_set_data  /api/set-data
// ---------------------------------------------------------------------------

/// Flat shape kept for existing front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacySetDataResponse {
    /// SET index reading.
    pub set_result: String,
    /// Traded value.
    pub value: String,
    /// Two-digit derived code.
    pub live_result: String,
    pub kind: OutcomeKind,
    pub session: Session,
    pub captured_at: DateTime<FixedOffset>,
}

impl LegacySetDataResponse {
    pub fn from_snapshot(kind: OutcomeKind, session: Session, snap: &Snapshot) -> Self {
        Self {
            set_result: snap.index_value().to_string(),
            value: snap.traded_value().to_string(),
            live_result: snap.derived_code().to_string(),
            kind,
            session,
            captured_at: snap.captured_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyErrorResponse {
    pub error: String,
    pub kind: OutcomeKind,
    pub session: Session,
}

pub fn no_data_message(kind: OutcomeKind) -> Option<&'static str> {
    match kind {
        OutcomeKind::NoDataYet => Some(NO_DATA_YET_MESSAGE),
        OutcomeKind::Unavailable => Some(UNAVAILABLE_MESSAGE),
        OutcomeKind::Live | OutcomeKind::Frozen => None,
    }
}
