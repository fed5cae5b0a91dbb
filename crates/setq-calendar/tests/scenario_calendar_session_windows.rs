//! Session classification scenario tests.
//!
//! Validates that the default SET calendar:
//! - Never opens on Saturday / Sunday, at any time of day.
//! - Opens Morning and Afternoon windows on weekdays.
//! - Reports Closed for the midday break and outside both windows.
//!
//! Reference dates (Asia/Bangkok, UTC+7, no DST):
//!   2024-01-06 Sat
//!   2024-01-07 Sun
//!   2024-01-09 Tue
//!   2024-01-12 Fri

use chrono::{TimeZone, Utc};
use setq_calendar::{Session, SessionWindow, TradingCalendar, DEFAULT_EXCHANGE_TZ};

fn bkk(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> chrono::DateTime<chrono_tz::Tz> {
    DEFAULT_EXCHANGE_TZ
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .expect("unambiguous local time")
}

#[test]
fn weekend_is_closed_at_every_minute() {
    let cal = TradingCalendar::default();
    for day in [6, 7] {
        for h in 0..24 {
            for m in 0..60 {
                assert_eq!(
                    cal.classify(&bkk(2024, 1, day, h, m)),
                    Session::Closed,
                    "2024-01-{day:02} {h:02}:{m:02} must be closed"
                );
            }
        }
    }
}

#[test]
fn tuesday_reference_points() {
    let cal = TradingCalendar::default();
    assert_eq!(cal.classify(&bkk(2024, 1, 9, 11, 45)), Session::Morning);
    assert_eq!(cal.classify(&bkk(2024, 1, 9, 16, 0)), Session::Afternoon);
    assert_eq!(cal.classify(&bkk(2024, 1, 9, 13, 0)), Session::Closed);
}

#[test]
fn friday_windows_open_like_any_weekday() {
    let cal = TradingCalendar::default();
    assert_eq!(cal.classify(&bkk(2024, 1, 12, 11, 30)), Session::Morning);
    assert_eq!(cal.classify(&bkk(2024, 1, 12, 16, 30)), Session::Afternoon);
    assert_eq!(cal.classify(&bkk(2024, 1, 12, 9, 0)), Session::Closed);
    assert_eq!(cal.classify(&bkk(2024, 1, 12, 23, 59)), Session::Closed);
}

#[test]
fn utc_input_near_midnight_uses_exchange_day() {
    let cal = TradingCalendar::default();
    // 2024-01-05 Fri 22:00 UTC = 2024-01-06 Sat 05:00 Bangkok
    let late_friday_utc = Utc.with_ymd_and_hms(2024, 1, 5, 22, 0, 0).unwrap();
    assert_eq!(cal.classify(&late_friday_utc), Session::Closed);
    // 2024-01-09 Tue 08:45 UTC = 15:45 Bangkok
    let tue_afternoon_utc = Utc.with_ymd_and_hms(2024, 1, 9, 8, 45, 0).unwrap();
    assert_eq!(cal.classify(&tue_afternoon_utc), Session::Afternoon);
}

#[test]
fn custom_windows_replace_defaults() {
    let cal = TradingCalendar::new(
        DEFAULT_EXCHANGE_TZ,
        vec![SessionWindow::parse(Session::Morning, "10:00", "10:30").unwrap()],
    );
    assert_eq!(cal.classify(&bkk(2024, 1, 9, 10, 15)), Session::Morning);
    assert_eq!(cal.classify(&bkk(2024, 1, 9, 11, 45)), Session::Closed);
    assert_eq!(cal.classify(&bkk(2024, 1, 9, 16, 0)), Session::Closed);
}
