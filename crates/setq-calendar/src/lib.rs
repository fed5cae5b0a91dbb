//! setq-calendar
//!
//! Exchange session clock for the SET snapshot service.
//!
//! Pure deterministic logic. No IO, no wall-clock. Callers supply `now`.

mod calendar;

pub use calendar::{CalendarError, Session, SessionWindow, TradingCalendar, DEFAULT_EXCHANGE_TZ};
