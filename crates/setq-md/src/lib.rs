//! setq-md
//!
//! Market-data boundary for the SET snapshot service.
//!
//! This crate owns the fetcher abstraction and the concrete HTML fetcher.
//! It knows nothing about sessions, derivation or caching; callers
//! (`setq-core`) decide what a fetched quote means.

pub mod fetcher;
pub mod set_overview;

pub use fetcher::{FetchError, MarketDataFetcher, RawQuote, StaticFetcher};
pub use set_overview::{FetcherSettings, SetOverviewFetcher};
