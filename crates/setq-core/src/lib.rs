//! setq-core
//!
//! Session-aware snapshot cache for the SET derived code.
//!
//! Architectural decisions:
//! - A `Snapshot` is immutable; the store swaps whole values, never fields.
//! - The derived code is computed from the decimal text, never from floats.
//! - Upstream and derivation failures fall back to the last committed value;
//!   nothing is ever fabricated to cover an outage.
//! - The store lock is never held across a fetch.

mod clock;
mod derive;
mod orchestrator;
mod snapshot;
mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use derive::{derive, DerivationError, NumberPart, QuoteField};
pub use orchestrator::{FreezeReason, Orchestrator, Outcome, OutcomeKind, DEFAULT_FETCH_TIMEOUT};
pub use snapshot::{DerivedCode, InvalidSnapshot, Snapshot, SnapshotRecord};
pub use store::SnapshotStore;

pub use setq_calendar::Session;
