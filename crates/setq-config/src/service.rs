//! Typed view of the daemon's configuration.
//!
//! Every field is optional; `None` means "use the built-in default of the
//! component that consumes it" (calendar windows, fetcher headers, ...).
//! Defaults therefore live next to the code they configure, not here.
//!
//! ```yaml
//! server:
//!   addr: "0.0.0.0:5000"
//!   cors_origins: ["http://localhost:3000"]
//! exchange:
//!   timezone: "Asia/Bangkok"
//!   morning:   { start: "11:30", end: "12:01" }
//!   afternoon: { start: "15:30", end: "16:30" }
//! upstream:
//!   url: "https://www.set.or.th/en/market/index/set/overview"
//!   timeout_secs: 10
//!   index_selector: "div.value.text-white.mb-0.me-2.lh-1.stock-info"
//!   traded_value_selector: "span.ms-2.ms-xl-4"
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub exchange: ExchangeConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address, e.g. `"0.0.0.0:5000"`.
    pub addr: Option<String>,
    /// Allowed CORS origins. Empty = any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// IANA zone name of the exchange.
    pub timezone: Option<String>,
    pub morning: Option<WindowConfig>,
    pub afternoon: Option<WindowConfig>,
}

/// `"HH:MM"` bounds, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
    pub referer: Option<String>,
    pub index_selector: Option<String>,
    pub traded_value_selector: Option<String>,
}
