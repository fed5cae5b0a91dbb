//! Config -> component wiring.
//!
//! Turns a [`ServiceConfig`] into the calendar, fetcher and orchestrator the
//! daemon runs with. Unset fields fall back to each component's own
//! defaults.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use setq_calendar::{Session, SessionWindow, TradingCalendar, DEFAULT_EXCHANGE_TZ};
use setq_config::{ExchangeConfig, ServiceConfig, UpstreamConfig, WindowConfig};
use setq_core::{Orchestrator, SnapshotStore};
use setq_md::{FetcherSettings, SetOverviewFetcher};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

pub fn calendar_from_config(cfg: &ExchangeConfig) -> Result<TradingCalendar> {
    let tz = match &cfg.timezone {
        Some(name) => TradingCalendar::parse_timezone(name).context("exchange.timezone")?,
        None => DEFAULT_EXCHANGE_TZ,
    };
    let morning = window(Session::Morning, cfg.morning.as_ref(), SessionWindow::morning())
        .context("exchange.morning")?;
    let afternoon = window(Session::Afternoon, cfg.afternoon.as_ref(), SessionWindow::afternoon())
        .context("exchange.afternoon")?;
    // Order matters: the first matching window wins on overlap.
    Ok(TradingCalendar::new(tz, vec![morning, afternoon]))
}

fn window(
    session: Session,
    cfg: Option<&WindowConfig>,
    default: SessionWindow,
) -> Result<SessionWindow, setq_calendar::CalendarError> {
    match cfg {
        Some(w) => SessionWindow::parse(session, &w.start, &w.end),
        None => Ok(default),
    }
}

pub fn fetcher_settings_from_config(cfg: &UpstreamConfig) -> FetcherSettings {
    let d = FetcherSettings::default();
    FetcherSettings {
        url: cfg.url.clone().unwrap_or(d.url),
        timeout: cfg.timeout_secs.map(Duration::from_secs).unwrap_or(d.timeout),
        user_agent: cfg.user_agent.clone().unwrap_or(d.user_agent),
        accept_language: cfg.accept_language.clone().unwrap_or(d.accept_language),
        referer: cfg.referer.clone().unwrap_or(d.referer),
        index_selector: cfg.index_selector.clone().unwrap_or(d.index_selector),
        traded_value_selector: cfg
            .traded_value_selector
            .clone()
            .unwrap_or(d.traded_value_selector),
    }
}

/// Build the orchestrator over a fresh (empty) snapshot store.
pub fn build_orchestrator(cfg: &ServiceConfig) -> Result<Orchestrator> {
    let calendar = calendar_from_config(&cfg.exchange)?;
    let settings = fetcher_settings_from_config(&cfg.upstream);
    let timeout = settings.timeout;
    let fetcher = SetOverviewFetcher::new(settings).context("upstream fetcher config")?;
    Ok(
        Orchestrator::new(calendar, Arc::new(fetcher), Arc::new(SnapshotStore::new()))
            .with_fetch_timeout(timeout),
    )
}

/// CLI / env override first, then `server.addr`, then the default.
pub fn resolve_bind_addr(cli: Option<SocketAddr>, cfg: &ServiceConfig) -> Result<SocketAddr> {
    if let Some(addr) = cli {
        return Ok(addr);
    }
    let raw = cfg.server.addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    raw.parse()
        .with_context(|| format!("server.addr is not a socket address: {raw}"))
}

/// CORS: any origin unless `server.cors_origins` narrows it. Read-only API,
/// so only GET is allowed.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
