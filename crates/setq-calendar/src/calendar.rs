//! Trading session calendar.
//!
//! Deterministic, pure logic. No IO, no wall-clock, no randomness.
//!
//! # Design
//!
//! [`TradingCalendar`] classifies a timestamp into one of the exchange's
//! intraday [`Session`]s. The snapshot orchestrator uses it once per request
//! to decide whether freshly fetched data is authoritative (an open session)
//! or whether the last committed value must be served frozen.
//!
//! # Rules
//!
//! - Weekdays only (Monday–Friday). Saturday and Sunday are always
//!   [`Session::Closed`].
//! - Two windows by default, in exchange-local time (`Asia/Bangkok`):
//!   Morning `[11:30, 12:01]` and Afternoon `[15:30, 16:30]`. Both endpoints
//!   are inclusive at minute resolution, so `12:01:59` is still Morning.
//! - Windows are checked in declaration order and the first match wins. The
//!   default windows never overlap; a configuration that makes them overlap
//!   resolves to the earlier-declared window (Morning before Afternoon).

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Exchange zone used when no configuration overrides it.
pub const DEFAULT_EXCHANGE_TZ: Tz = chrono_tz::Asia::Bangkok;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Session classification for a single instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    Morning,
    Afternoon,
    Closed,
}

impl Session {
    /// `true` for Morning / Afternoon: fresh upstream data is authoritative.
    pub fn is_open(&self) -> bool {
        !matches!(self, Session::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Morning => "morning",
            Session::Afternoon => "afternoon",
            Session::Closed => "closed",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("{session} window ends ({end}) before it starts ({start})")]
    InvertedWindow {
        session: Session,
        start: NaiveTime,
        end: NaiveTime,
    },
    #[error("a session window cannot be tagged closed")]
    ClosedWindow,
    #[error("unknown IANA timezone '{0}'")]
    UnknownTimezone(String),
}

// ---------------------------------------------------------------------------
// SessionWindow
// ---------------------------------------------------------------------------

/// One intraday trading window, inclusive at both ends (minute resolution).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionWindow {
    session: Session,
    start: NaiveTime,
    end: NaiveTime,
}

impl SessionWindow {
    pub fn new(session: Session, start: NaiveTime, end: NaiveTime) -> Result<Self, CalendarError> {
        if session == Session::Closed {
            return Err(CalendarError::ClosedWindow);
        }
        let start = truncate_to_minute(start);
        let end = truncate_to_minute(end);
        if end < start {
            return Err(CalendarError::InvertedWindow {
                session,
                start,
                end,
            });
        }
        Ok(Self {
            session,
            start,
            end,
        })
    }

    /// Build a window from `"HH:MM"` strings.
    pub fn parse(session: Session, start: &str, end: &str) -> Result<Self, CalendarError> {
        Self::new(session, parse_hhmm(start)?, parse_hhmm(end)?)
    }

    pub fn morning() -> Self {
        Self {
            session: Session::Morning,
            start: hm(11, 30),
            end: hm(12, 1),
        }
    }

    pub fn afternoon() -> Self {
        Self {
            session: Session::Afternoon,
            start: hm(15, 30),
            end: hm(16, 30),
        }
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Inclusive containment check; seconds are ignored.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let t = truncate_to_minute(time);
        self.start <= t && t <= self.end
    }
}

// ---------------------------------------------------------------------------
// TradingCalendar
// ---------------------------------------------------------------------------

/// Session clock for a single exchange.
#[derive(Clone, Debug)]
pub struct TradingCalendar {
    tz: Tz,
    windows: Vec<SessionWindow>,
}

impl Default for TradingCalendar {
    fn default() -> Self {
        Self {
            tz: DEFAULT_EXCHANGE_TZ,
            windows: vec![SessionWindow::morning(), SessionWindow::afternoon()],
        }
    }
}

impl TradingCalendar {
    /// Windows are matched in the order given.
    pub fn new(tz: Tz, windows: Vec<SessionWindow>) -> Self {
        Self { tz, windows }
    }

    /// Resolve an IANA zone name (e.g. `"Asia/Bangkok"`).
    pub fn parse_timezone(name: &str) -> Result<Tz, CalendarError> {
        name.trim()
            .parse::<Tz>()
            .map_err(|_| CalendarError::UnknownTimezone(name.to_string()))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn windows(&self) -> &[SessionWindow] {
        &self.windows
    }

    /// Classify an instant in any zone; it is converted to exchange-local
    /// time first.
    pub fn classify<Z: TimeZone>(&self, now: &DateTime<Z>) -> Session {
        let local = now.with_timezone(&self.tz);
        self.classify_local(&local.naive_local())
    }

    /// Classify a wall-clock time that is already exchange-local.
    pub fn classify_local(&self, local: &NaiveDateTime) -> Session {
        if !is_trading_day(local.weekday()) {
            return Session::Closed;
        }
        let time = local.time();
        self.windows
            .iter()
            .find(|w| w.contains(time))
            .map(|w| w.session)
            .unwrap_or(Session::Closed)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_trading_day(day: Weekday) -> bool {
    !matches!(day, Weekday::Sat | Weekday::Sun)
}

fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

fn parse_hhmm(s: &str) -> Result<NaiveTime, CalendarError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| CalendarError::InvalidTime(s.to_string()))
}

// Only called with literal in-range constants.
fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

// ---------------------------------------------------------------------------
// Unit tests (fast, no external dependencies)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    // Reference dates:
    //   2024-01-06 Sat
    //   2024-01-07 Sun
    //   2024-01-09 Tue
    // Bangkok is UTC+7 with no daylight saving.

    fn tue(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn tuesday_mid_morning_is_morning() {
        let cal = TradingCalendar::default();
        assert_eq!(cal.classify_local(&tue(11, 45, 0)), Session::Morning);
    }

    #[test]
    fn morning_upper_bound_includes_whole_minute() {
        let cal = TradingCalendar::default();
        assert_eq!(cal.classify_local(&tue(12, 1, 0)), Session::Morning);
        assert_eq!(cal.classify_local(&tue(12, 1, 59)), Session::Morning);
        assert_eq!(cal.classify_local(&tue(12, 2, 0)), Session::Closed);
    }

    #[test]
    fn afternoon_bounds_are_inclusive() {
        let cal = TradingCalendar::default();
        assert_eq!(cal.classify_local(&tue(15, 29, 59)), Session::Closed);
        assert_eq!(cal.classify_local(&tue(15, 30, 0)), Session::Afternoon);
        assert_eq!(cal.classify_local(&tue(16, 30, 0)), Session::Afternoon);
        assert_eq!(cal.classify_local(&tue(16, 31, 0)), Session::Closed);
    }

    #[test]
    fn classify_converts_utc_to_exchange_time() {
        let cal = TradingCalendar::default();
        // 04:45 UTC = 11:45 Bangkok
        let now = Utc.with_ymd_and_hms(2024, 1, 9, 4, 45, 0).unwrap();
        assert_eq!(cal.classify(&now), Session::Morning);
    }

    #[test]
    fn overlapping_windows_pick_first_declared() {
        let morning = SessionWindow::parse(Session::Morning, "11:30", "15:45").unwrap();
        let afternoon = SessionWindow::parse(Session::Afternoon, "15:30", "16:30").unwrap();
        let cal = TradingCalendar::new(DEFAULT_EXCHANGE_TZ, vec![morning, afternoon]);
        assert_eq!(cal.classify_local(&tue(15, 40, 0)), Session::Morning);
        assert_eq!(cal.classify_local(&tue(15, 50, 0)), Session::Afternoon);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = SessionWindow::parse(Session::Morning, "12:01", "11:30").unwrap_err();
        assert!(matches!(err, CalendarError::InvertedWindow { .. }));
    }

    #[test]
    fn closed_window_is_rejected() {
        let err = SessionWindow::parse(Session::Closed, "09:00", "10:00").unwrap_err();
        assert_eq!(err, CalendarError::ClosedWindow);
    }

    #[test]
    fn malformed_time_is_rejected() {
        let err = SessionWindow::parse(Session::Morning, "11h30", "12:01").unwrap_err();
        assert_eq!(err, CalendarError::InvalidTime("11h30".to_string()));
    }

    #[test]
    fn timezone_names_resolve() {
        assert_eq!(
            TradingCalendar::parse_timezone("Asia/Bangkok").unwrap(),
            DEFAULT_EXCHANGE_TZ
        );
        assert!(TradingCalendar::parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn session_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Session::Afternoon).unwrap(),
            "\"afternoon\""
        );
        assert!(Session::Morning.is_open());
        assert!(!Session::Closed.is_open());
    }
}
