//! Sample Fetch Library
//!
//! Discovers and downloads instrument sample recordings published on a
//! catalog of index pages, grouped by era and instrument section.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Era → section → seed page catalog
//! - [`selector`] - Era/section filtering of the catalog
//! - [`scrape`] - Audio link extraction from seed pages
//! - [`fetch`] - Concurrent fetch-and-store pipeline
//! - [`app`] - List and download orchestration
//! - [`config`] - Validated run configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod http;
pub mod link;
pub mod scrape;
pub mod selector;
mod user_agent;

// Re-export commonly used types
pub use app::{App, AppError, DownloadReport};
pub use catalog::{Catalog, CatalogError};
pub use config::{Config, ConfigError};
pub use fetch::{FetchError, FetchPipeline, FetchSummary};
pub use http::build_http_client;
pub use link::{AUDIO_SUFFIXES, AudioLink};
pub use scrape::{PageScraper, ScrapeError, extract_audio_links};
pub use selector::{ALL_ERAS, SelectError, select};
