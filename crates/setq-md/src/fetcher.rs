//! Fetcher boundary for live SET index readings.
//!
//! This module defines **only** the raw quote type, the error taxonomy and
//! the fetcher trait, plus an in-memory fetcher for wiring tests. No HTML,
//! no HTTP.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Raw quote
// ---------------------------------------------------------------------------

/// The two fields scraped from upstream, verbatim.
///
/// Both are decimal strings exactly as displayed (grouping commas included)
/// so derivation can work on the text without floating-point rounding being
/// introduced at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuote {
    /// SET index reading, e.g. `"1,278.05"`.
    pub index_value: String,
    /// Traded value (M.Baht), e.g. `"42,552.94"`.
    pub traded_value: String,
}

impl RawQuote {
    pub fn new(index_value: impl Into<String>, traded_value: impl Into<String>) -> Self {
        Self {
            index_value: index_value.into(),
            traded_value: traded_value.into(),
        }
    }

    /// `true` when both fields carry non-blank text.
    pub fn is_complete(&self) -> bool {
        !self.index_value.trim().is_empty() && !self.traded_value.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`MarketDataFetcher`] may return. All of them are recoverable
/// by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The upstream answered with a non-success HTTP status.
    #[error("upstream http status {0}")]
    Status(u16),
    /// The upstream did not answer in time.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
    /// The page loaded but a required field was absent or blank.
    #[error("field '{0}' not found on upstream page")]
    MissingField(&'static str),
    /// A CSS selector in the fetcher settings does not parse.
    #[error("invalid selector '{0}'")]
    Selector(String),
    /// A request header in the fetcher settings is not a valid header value.
    #[error("invalid header {0}")]
    InvalidHeader(String),
}

// ---------------------------------------------------------------------------
// Fetcher trait
// ---------------------------------------------------------------------------

/// Upstream market-data source contract.
///
/// Object-safe so callers can hold an `Arc<dyn MarketDataFetcher>`, and
/// `Send + Sync` so it can be shared across request handlers.
#[async_trait::async_trait]
pub trait MarketDataFetcher: Send + Sync {
    /// Human-readable name identifying this source (e.g. `"set.or.th"`).
    fn source_name(&self) -> &'static str;

    /// Fetch the current index and traded-value readings.
    async fn fetch(&self) -> Result<RawQuote, FetchError>;
}

// ---------------------------------------------------------------------------
// StaticFetcher
// ---------------------------------------------------------------------------

/// In-memory fetcher returning a settable canned result.
///
/// Used to wire the daemon without a network, and by scenario tests that
/// need to flip the upstream between healthy and failing.
#[derive(Debug)]
pub struct StaticFetcher {
    next: Mutex<Result<RawQuote, FetchError>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn ok(index_value: &str, traded_value: &str) -> Self {
        Self::with_result(Ok(RawQuote::new(index_value, traded_value)))
    }

    pub fn failing(err: FetchError) -> Self {
        Self::with_result(Err(err))
    }

    pub fn with_result(result: Result<RawQuote, FetchError>) -> Self {
        Self {
            next: Mutex::new(result),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the result returned by subsequent fetches.
    pub fn set(&self, result: Result<RawQuote, FetchError>) {
        let mut slot = self.next.lock().unwrap_or_else(|p| p.into_inner());
        *slot = result;
    }

    /// Number of `fetch` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MarketDataFetcher for StaticFetcher {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self) -> Result<RawQuote, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let slot = self.next.lock().unwrap_or_else(|p| p.into_inner());
        slot.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
