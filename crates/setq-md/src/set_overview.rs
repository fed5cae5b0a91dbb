//! HTML-backed fetcher for the SET index overview page.
//!
//! The upstream exposes no API for these two numbers, so the page is
//! fetched with browser-like headers and the values are read out of the DOM
//! with CSS selectors. Selectors live in [`FetcherSettings`] because the
//! page markup changes without notice.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use scraper::{Html, Selector};
use tracing::debug;

use crate::fetcher::{FetchError, MarketDataFetcher, RawQuote};

pub const DEFAULT_OVERVIEW_URL: &str = "https://www.set.or.th/en/market/index/set/overview";
pub const DEFAULT_INDEX_SELECTOR: &str = "div.value.text-white.mb-0.me-2.lh-1.stock-info";
pub const DEFAULT_TRADED_VALUE_SELECTOR: &str = "span.ms-2.ms-xl-4";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherSettings {
    pub url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
    pub index_selector: String,
    pub traded_value_selector: String,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERVIEW_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://www.google.com/".to_string(),
            index_selector: DEFAULT_INDEX_SELECTOR.to_string(),
            traded_value_selector: DEFAULT_TRADED_VALUE_SELECTOR.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SetOverviewFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SetOverviewFetcher {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    index_selector: Selector,
    traded_value_selector: Selector,
}

impl SetOverviewFetcher {
    /// Build the HTTP client and compile the selectors.
    ///
    /// Fails on an unparsable selector or header value so a bad config is
    /// caught at startup, not on the first request.
    pub fn new(settings: FetcherSettings) -> Result<Self, FetchError> {
        let index_selector = parse_selector(&settings.index_selector)?;
        let traded_value_selector = parse_selector(&settings.traded_value_selector)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("user-agent", &settings.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("accept-language", &settings.accept_language)?,
        );
        headers.insert(REFERER, header_value("referer", &settings.referer)?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url: settings.url,
            timeout: settings.timeout,
            index_selector,
            traded_value_selector,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl MarketDataFetcher for SetOverviewFetcher {
    fn source_name(&self) -> &'static str {
        "set.or.th"
    }

    async fn fetch(&self) -> Result<RawQuote, FetchError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        let quote = extract_quote(&body, &self.index_selector, &self.traded_value_selector)?;
        debug!(
            source = self.source_name(),
            index_value = %quote.index_value,
            traded_value = %quote.traded_value,
            "upstream quote scraped"
        );
        Ok(quote)
    }
}

impl SetOverviewFetcher {
    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// DOM extraction
// ---------------------------------------------------------------------------

/// Read both fields out of an overview page. The first match of each
/// selector wins; surrounding whitespace is trimmed.
pub fn extract_quote(
    html: &str,
    index_selector: &Selector,
    traded_value_selector: &Selector,
) -> Result<RawQuote, FetchError> {
    let doc = Html::parse_document(html);
    let index_value =
        first_text(&doc, index_selector).ok_or(FetchError::MissingField("index_value"))?;
    let traded_value =
        first_text(&doc, traded_value_selector).ok_or(FetchError::MissingField("traded_value"))?;
    Ok(RawQuote {
        index_value,
        traded_value,
    })
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    let el = doc.select(selector).next()?;
    let text: String = el.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_selector(raw: &str) -> Result<Selector, FetchError> {
    Selector::parse(raw).map_err(|_| FetchError::Selector(raw.to_string()))
}

fn header_value(name: &str, raw: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(raw).map_err(|_| FetchError::InvalidHeader(name.to_string()))
}

// -----------------
// Tests (no network)
// -----------------
