//! Top-level orchestration: list seed pages or download their samples.
//!
//! Download mode walks the selected seed pages one at a time. Each page is
//! scraped, then its links go through one [`FetchPipeline`] batch before the
//! next page is requested. The first failure ends the run.

use std::io::Write;

use reqwest::Client;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::Config;
use crate::fetch::{FetchError, FetchPipeline};
use crate::http::build_http_client;
use crate::scrape::{PageScraper, ScrapeError};
use crate::selector::{self, SelectError};

/// Errors surfaced by [`App`] operations, tagged with the failing stage.
#[derive(Debug, Error)]
pub enum AppError {
    /// The HTTP client could not be constructed.
    #[error("building HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The era/section selection is not in the catalog.
    #[error("getting urls: {0}")]
    Select(#[from] SelectError),

    /// A seed page could not be scraped.
    #[error("scraping {seed}: {source}")]
    Scrape {
        /// The seed page URL.
        seed: String,
        /// The scrape failure.
        #[source]
        source: ScrapeError,
    },

    /// A sample from a seed page could not be fetched or stored.
    #[error("downloading samples from {seed}: {source}")]
    Fetch {
        /// The seed page URL the samples were found on.
        seed: String,
        /// The first fetch failure of the batch.
        #[source]
        source: FetchError,
    },

    /// The URL list could not be encoded.
    #[error("encoding url list: {0}")]
    Encode(#[from] serde_json::Error),

    /// The URL list could not be written.
    #[error("writing url list: {0}")]
    Output(#[from] std::io::Error),
}

/// Totals for a completed download run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Seed pages scraped.
    pub seeds: usize,
    /// Distinct audio links found across all seed pages.
    pub links: usize,
    /// Files written.
    pub files: usize,
    /// Bytes written.
    pub bytes: u64,
}

/// The application: a validated [`Config`] plus the network collaborators.
#[derive(Debug, Clone)]
pub struct App {
    config: Config,
    scraper: PageScraper,
    pipeline: FetchPipeline,
}

impl App {
    /// Creates the application with a freshly built HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::HttpClient`] if the client cannot be built.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = build_http_client().map_err(AppError::HttpClient)?;
        Ok(Self::with_client(config, client))
    }

    /// Creates the application around an existing HTTP client.
    #[must_use]
    pub fn with_client(config: Config, client: Client) -> Self {
        let scraper = PageScraper::new(client.clone());
        let pipeline = FetchPipeline::new(client, config.output_dir.clone());
        Self {
            config,
            scraper,
            pipeline,
        }
    }

    /// Returns the configuration the app was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs download mode or list mode, depending on the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`AppError`] of the selected mode.
    pub async fn run(&self) -> Result<(), AppError> {
        if self.config.download {
            self.download().await.map(|_| ())
        } else {
            self.list()
        }
    }

    /// Returns the seed page URLs selected by the configured era and section.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError`] if the filter does not match the catalog.
    pub fn seed_urls(&self) -> Result<Vec<String>, SelectError> {
        selector::select(&self.config.catalog, &self.config.era, &self.config.section)
    }

    /// Writes the selected seed page URLs to stdout as a JSON array.
    ///
    /// # Errors
    ///
    /// Same as [`list_to`](Self::list_to).
    pub fn list(&self) -> Result<(), AppError> {
        self.list_to(std::io::stdout().lock())
    }

    /// Writes the selected seed page URLs to `out` as one JSON array
    /// followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Select`] for an unknown filter, or an encoding or
    /// IO error from writing.
    pub fn list_to<W: Write>(&self, mut out: W) -> Result<(), AppError> {
        let urls = self.seed_urls()?;
        serde_json::to_writer(&mut out, &urls)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    /// Scrapes every selected seed page and downloads its samples.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Scrape`] or [`AppError::Fetch`] naming the seed
    /// page being processed when the run stopped.
    #[instrument(skip(self), fields(era = %self.config.era, section = %self.config.section))]
    pub async fn download(&self) -> Result<DownloadReport, AppError> {
        let seeds = self.seed_urls()?;
        info!(
            seeds = seeds.len(),
            output_dir = %self.pipeline.output_dir().display(),
            "starting download"
        );

        let mut report = DownloadReport::default();
        for seed in seeds {
            let links = self
                .scraper
                .scrape(&seed)
                .await
                .map_err(|source| AppError::Scrape {
                    seed: seed.clone(),
                    source,
                })?;

            let summary = self
                .pipeline
                .fetch_all(&links)
                .await
                .map_err(|source| AppError::Fetch {
                    seed: seed.clone(),
                    source,
                })?;

            report.seeds += 1;
            report.links += links.len();
            report.files += summary.files;
            report.bytes += summary.bytes;
        }

        info!(
            seeds = report.seeds,
            links = report.links,
            files = report.files,
            bytes = report.bytes,
            "download complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::catalog::Catalog;

    fn app_for(era: &str, section: &str) -> App {
        let config = Config::new(Catalog::builtin(), era, section).unwrap();
        App::with_client(config, Client::new())
    }

    #[test]
    fn test_list_to_writes_json_array_and_newline() {
        let app = app_for("pre-2012", "piano/other");
        let mut out = Vec::new();
        app.list_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[\"http://theremin.music.uiowa.edu/MISpiano.html\",\
             \"http://theremin.music.uiowa.edu/MISballoonpop.html\",\
             \"http://theremin.music.uiowa.edu/MISguitar.html\"]\n"
        );
    }

    #[test]
    fn test_list_to_all_matches_catalog_size() {
        let app = app_for("all", "");
        let mut out = Vec::new();
        app.list_to(&mut out).unwrap();
        let urls: Vec<String> = serde_json::from_slice(&out).unwrap();
        assert_eq!(urls.len(), Catalog::builtin().len());
    }

    #[test]
    fn test_list_to_reports_select_error() {
        // Bypass Config::new validation to exercise the runtime check.
        let mut config = Config::default();
        config.era = "bogus-era".to_string();
        let app = App::with_client(config, Client::new());
        let err = app.list_to(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "getting urls: unsupported era: bogus-era");
    }

    #[tokio::test]
    async fn test_download_empty_catalog_reports_nothing() {
        let config = Config::new(Catalog::new(BTreeMap::new()), "all", "").unwrap();
        let app = App::with_client(config.with_download(true), Client::new());
        assert_eq!(app.download().await.unwrap(), DownloadReport::default());
    }
}
