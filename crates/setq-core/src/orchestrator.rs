//! Per-request fetch-or-freeze decision.
//!
//! ```text
//! classify(now)
//!   Closed            -> store.read()            -> Frozen | NoDataYet
//!   Morning/Afternoon -> fetch -> derive -> commit -> Live
//!                        (any failure)  -> store.read() -> Frozen | Unavailable
//! ```
//!
//! The orchestrator holds no state of its own beyond the injected store.
//! Fetch and derivation failures are recovered here and never escape as a
//! request error. No retries: one fetch per request, bounded by a timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use setq_calendar::{Session, TradingCalendar};
use setq_md::MarketDataFetcher;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a held-over snapshot was served instead of a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeReason {
    SessionClosed,
    FetchFailed,
    DerivationFailed,
}

impl FreezeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreezeReason::SessionClosed => "session_closed",
            FreezeReason::FetchFailed => "fetch_failed",
            FreezeReason::DerivationFailed => "derivation_failed",
        }
    }
}

impl fmt::Display for FreezeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Live,
    Frozen,
    NoDataYet,
    Unavailable,
}

/// Result of one "get current market data" request. Every variant carries
/// the session classification at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Fetched, derived and committed during this request.
    Live { session: Session, snapshot: Snapshot },
    /// Last committed snapshot, unchanged.
    Frozen {
        session: Session,
        snapshot: Snapshot,
        reason: FreezeReason,
    },
    /// Session closed and nothing has been committed since startup.
    NoDataYet { session: Session },
    /// Session open, upstream failed, and nothing has ever been committed.
    Unavailable { session: Session },
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Live { .. } => OutcomeKind::Live,
            Outcome::Frozen { .. } => OutcomeKind::Frozen,
            Outcome::NoDataYet { .. } => OutcomeKind::NoDataYet,
            Outcome::Unavailable { .. } => OutcomeKind::Unavailable,
        }
    }

    pub fn session(&self) -> Session {
        match self {
            Outcome::Live { session, .. }
            | Outcome::Frozen { session, .. }
            | Outcome::NoDataYet { session }
            | Outcome::Unavailable { session } => *session,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Outcome::Live { snapshot, .. } | Outcome::Frozen { snapshot, .. } => Some(snapshot),
            Outcome::NoDataYet { .. } | Outcome::Unavailable { .. } => None,
        }
    }

    pub fn freeze_reason(&self) -> Option<FreezeReason> {
        match self {
            Outcome::Frozen { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    calendar: TradingCalendar,
    fetcher: Arc<dyn MarketDataFetcher>,
    store: Arc<SnapshotStore>,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        calendar: TradingCalendar,
        fetcher: Arc<dyn MarketDataFetcher>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            calendar,
            fetcher,
            store,
            clock: Arc::new(SystemClock),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Session classification right now, without touching store or upstream.
    pub fn current_session(&self) -> Session {
        self.calendar.classify(&self.clock.now())
    }

    /// Serve one "get current market data" request.
    pub async fn current(&self) -> Outcome {
        let now = self.clock.now().with_timezone(&self.calendar.timezone());
        let session = self.calendar.classify(&now);

        if !session.is_open() {
            return match self.store.read().await {
                Some(snapshot) => {
                    debug!(
                        %session,
                        derived_code = %snapshot.derived_code(),
                        "session closed; serving frozen snapshot"
                    );
                    Outcome::Frozen {
                        session,
                        snapshot,
                        reason: FreezeReason::SessionClosed,
                    }
                }
                None => Outcome::NoDataYet { session },
            };
        }

        let reason = match self.fetch_and_derive(now.fixed_offset(), session).await {
            Ok(candidate) => {
                let snapshot = self.store.commit(candidate).await;
                info!(
                    %session,
                    derived_code = %snapshot.derived_code(),
                    index_value = snapshot.index_value(),
                    traded_value = snapshot.traded_value(),
                    "snapshot committed"
                );
                return Outcome::Live { session, snapshot };
            }
            Err(reason) => reason,
        };

        match self.store.read().await {
            Some(snapshot) => Outcome::Frozen {
                session,
                snapshot,
                reason,
            },
            None => {
                warn!(%session, "no snapshot committed yet; upstream unavailable");
                Outcome::Unavailable { session }
            }
        }
    }

    /// One bounded fetch followed by derivation. The store is not touched.
    async fn fetch_and_derive(
        &self,
        captured_at: DateTime<FixedOffset>,
        session: Session,
    ) -> Result<Snapshot, FreezeReason> {
        let source = self.fetcher.source_name();
        let quote = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch()).await {
            Ok(Ok(quote)) => quote,
            Ok(Err(e)) => {
                warn!(source, error = %e, "upstream fetch failed");
                return Err(FreezeReason::FetchFailed);
            }
            Err(_) => {
                warn!(
                    source,
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "upstream fetch timed out"
                );
                return Err(FreezeReason::FetchFailed);
            }
        };

        if !quote.is_complete() {
            warn!(source, ?quote, "upstream quote has an empty field");
            return Err(FreezeReason::FetchFailed);
        }

        Snapshot::capture(&quote.index_value, &quote.traded_value, captured_at, session).map_err(
            |e| {
                warn!(source, error = %e, ?quote, "derivation failed");
                FreezeReason::DerivationFailed
            },
        )
    }
}
