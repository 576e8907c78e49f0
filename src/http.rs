//! Shared HTTP client construction.
//!
//! One client is built per run and cloned into the scraper and the fetch
//! pipeline so both share a connection pool.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::user_agent;

/// Default HTTP connect timeout (30 seconds).
///
/// No read timeout is applied: sample files can be large and a slow body is
/// left to finish.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Builds the shared HTTP client.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] if the TLS backend or system
/// configuration cannot be initialized.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let connect_timeout = Duration::from_secs(CONNECT_TIMEOUT_SECS);
    debug!(
        connect_timeout_ms = connect_timeout.as_millis(),
        "building HTTP client"
    );
    Client::builder()
        .user_agent(user_agent::default_user_agent())
        .connect_timeout(connect_timeout)
        .gzip(true)
        .build()
}
