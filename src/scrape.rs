//! Index page scraping: find audio-file anchors on a seed page.
//!
//! A seed page is fetched once and parsed into a document tree. The `href`
//! of every anchor element is collected, and the values that end in an audio
//! suffix are resolved against the seed page's host. Results are
//! deduplicated per page.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::link::{AudioLink, has_audio_suffix};

/// Anchor elements carrying an `href` attribute.
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a[href]"));

/// Relative prefix removed from hrefs before resolution.
const PARENT_PREFIX: &str = "../";

fn compile_static_selector(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid static selector '{selector}': {e}"))
}

/// Errors that can occur while scraping a seed page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The seed URL does not parse or has no host.
    #[error("invalid seed URL: {url}")]
    InvalidUrl {
        /// The offending seed URL.
        url: String,
    },

    /// Network-level failure requesting the page.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The seed URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The page responded with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The seed URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The page body could not be read as text.
    #[error("failed to read page body from {url}: {source}")]
    Body {
        /// The seed URL.
        url: String,
        /// The underlying decode/transport error.
        #[source]
        source: reqwest::Error,
    },
}

impl ScrapeError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a body read error.
    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }
}

/// Fetches seed pages and extracts their audio links.
#[derive(Debug, Clone)]
pub struct PageScraper {
    client: Client,
}

impl PageScraper {
    /// Creates a scraper that issues requests through `client`.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `seed_url` and returns the distinct audio links it references.
    ///
    /// Links are resolved against the host of `seed_url` itself, even when
    /// the request was redirected elsewhere. The returned list is sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the seed URL is malformed, the request
    /// fails, the server answers with a non-success status, or the body
    /// cannot be read.
    #[instrument(skip(self), fields(seed = %seed_url))]
    pub async fn scrape(&self, seed_url: &str) -> Result<Vec<AudioLink>, ScrapeError> {
        let host = seed_host(seed_url).ok_or_else(|| ScrapeError::invalid_url(seed_url))?;

        debug!("requesting index page");
        let response = self
            .client
            .get(seed_url)
            .send()
            .await
            .map_err(|e| ScrapeError::network(seed_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::http_status(seed_url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::body(seed_url, e))?;

        let links: Vec<AudioLink> = extract_audio_links(&body, &host).into_iter().collect();
        info!(links = links.len(), bytes = body.len(), "scraped index page");
        Ok(links)
    }
}

/// Extracts the audio links referenced by anchors in `html`.
///
/// `host` is the authority (host with optional port) the links are resolved
/// against; every link is built as `http://{host}/{href}` after a leading
/// `../` is removed from the href. Links are stored in normalized URL form,
/// so spellings of the same resource (`a b.wav`, `a%20b.wav`) collapse into
/// one entry.
#[must_use]
pub fn extract_audio_links(html: &str, host: &str) -> BTreeSet<AudioLink> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| has_audio_suffix(href))
        .map(|href| {
            let relative = href.strip_prefix(PARENT_PREFIX).unwrap_or(href);
            AudioLink::new(format!("http://{host}/{relative}"))
        })
        .collect()
}

/// Returns the authority of `seed_url` (host plus explicit port).
fn seed_host(seed_url: &str) -> Option<String> {
    let url = Url::parse(seed_url).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
