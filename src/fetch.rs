//! Concurrent fetch-and-store pipeline for audio links.
//!
//! # Concurrency Model
//!
//! - Every link gets a fetcher task and a writer task on one [`JoinSet`]
//! - Fetchers deliver responses into a single-slot handoff shared by the
//!   whole batch; whichever writer is waiting picks up whichever download
//!   arrives first, so writers are not paired with a particular fetcher
//! - The first failure cancels a shared [`CancellationToken`]; tasks observe
//!   it while waiting on the handoff, not during a request or a file copy
//! - Every task is joined before [`FetchPipeline::fetch_all`] returns, on
//!   the error path too

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::link::AudioLink;

/// Capacity of the fetcher → writer handoff.
const HANDOFF_CAPACITY: usize = 1;

/// Errors that can occur while fetching or storing audio files.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, reset body).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while storing a download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The link has no path that can be stored under the output directory.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A fetch or write task panicked or was aborted.
    #[error("download task failed: {reason}")]
    TaskFailed {
        /// Description of the join failure.
        reason: String,
    },
}

impl FetchError {
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

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    fn task_failed(error: &JoinError) -> Self {
        Self::TaskFailed {
            reason: error.to_string(),
        }
    }
}

/// Totals for one successful [`FetchPipeline::fetch_all`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Number of files written.
    pub files: usize,
    /// Number of bytes written across all files.
    pub bytes: u64,
}

/// A fetched response waiting to be stored, owned by exactly one task.
#[derive(Debug)]
struct DownloadItem {
    link: AudioLink,
    response: reqwest::Response,
}

/// Receiving end of the handoff, shared by every writer in a batch.
type Handoff = Arc<Mutex<mpsc::Receiver<DownloadItem>>>;

/// What a finished task accomplished.
#[derive(Debug)]
enum TaskOutcome {
    /// A fetcher delivered its response to the handoff.
    Delivered,
    /// A writer stored one file.
    Stored { bytes: u64 },
    /// The task stopped at the handoff because the batch was cancelled.
    Abandoned,
}

/// Downloads batches of audio links into an output directory.
#[derive(Debug, Clone)]
pub struct FetchPipeline {
    client: Client,
    output_dir: PathBuf,
}

impl FetchPipeline {
    /// Creates a pipeline that requests through `client` and writes below
    /// `output_dir`.
    #[must_use]
    pub fn new(client: Client, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    /// Returns the directory files are written below.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetches every link concurrently and stores each at its local path.
    ///
    /// Repeated links are fetched once, so every local path has a single
    /// writer.
    ///
    /// # Errors
    ///
    /// Returns the first [`FetchError`] raised by any fetcher or writer. The
    /// remaining tasks are cancelled at their next handoff wait and joined
    /// before this returns; files already written are left in place.
    #[instrument(skip(self, links), fields(links = links.len(), output_dir = %self.output_dir.display()))]
    pub async fn fetch_all(&self, links: &[AudioLink]) -> Result<FetchSummary, FetchError> {
        if links.is_empty() {
            debug!("no links to fetch");
            return Ok(FetchSummary::default());
        }

        let unique: BTreeSet<&AudioLink> = links.iter().collect();
        if unique.len() < links.len() {
            debug!(
                duplicates = links.len() - unique.len(),
                "dropping repeated links"
            );
        }

        let cancel = CancellationToken::new();
        let (sender, receiver) = mpsc::channel(HANDOFF_CAPACITY);
        let handoff: Handoff = Arc::new(Mutex::new(receiver));
        let mut tasks = JoinSet::new();

        for link in unique {
            tasks.spawn(fetch_one(
                self.client.clone(),
                link.clone(),
                sender.clone(),
                cancel.clone(),
            ));
            tasks.spawn(store_one(
                Arc::clone(&handoff),
                self.output_dir.clone(),
                cancel.clone(),
            ));
        }
        // Writers see a closed handoff once every fetcher has finished.
        drop(sender);

        let mut summary = FetchSummary::default();
        let mut first_error = None;

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|e| Err(FetchError::task_failed(&e)));
            match outcome {
                Ok(TaskOutcome::Stored { bytes }) => {
                    summary.files += 1;
                    summary.bytes += bytes;
                }
                Ok(TaskOutcome::Delivered | TaskOutcome::Abandoned) => {}
                Err(e) if first_error.is_none() => {
                    warn!(error = %e, "download failed, cancelling batch");
                    cancel.cancel();
                    first_error = Some(e);
                }
                Err(e) => debug!(error = %e, "additional failure after cancellation"),
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        info!(files = summary.files, bytes = summary.bytes, "batch complete");
        Ok(summary)
    }
}

#[instrument(skip_all, fields(url = %link))]
async fn fetch_one(
    client: Client,
    link: AudioLink,
    sender: mpsc::Sender<DownloadItem>,
    cancel: CancellationToken,
) -> Result<TaskOutcome, FetchError> {
    let response = client
        .get(link.as_str())
        .send()
        .await
        .map_err(|e| FetchError::network(link.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::http_status(link.as_str(), status.as_u16()));
    }
    debug!(status = status.as_u16(), "response received");

    let item = DownloadItem { link, response };
    tokio::select! {
        biased;
        () = cancel.cancelled() => Ok(TaskOutcome::Abandoned),
        sent = sender.send(item) => Ok(if sent.is_ok() {
            TaskOutcome::Delivered
        } else {
            TaskOutcome::Abandoned
        }),
    }
}

async fn store_one(
    handoff: Handoff,
    output_dir: PathBuf,
    cancel: CancellationToken,
) -> Result<TaskOutcome, FetchError> {
    let received = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        item = async { handoff.lock().await.recv().await } => item,
    };
    let Some(DownloadItem { link, response }) = received else {
        return Ok(TaskOutcome::Abandoned);
    };

    let relative = link
        .local_path()
        .ok_or_else(|| FetchError::invalid_url(link.as_str()))?;
    let file_path = output_dir.join(relative);

    let bytes = write_response(response, &link, &file_path).await?;
    info!(url = %link, path = %file_path.display(), bytes, "stored sample");
    Ok(TaskOutcome::Stored { bytes })
}

/// Creates parent directories and streams `response` into `file_path`.
///
/// A partially written file is removed if the copy fails.
async fn write_response(
    response: reqwest::Response,
    link: &AudioLink,
    file_path: &Path,
) -> Result<u64, FetchError> {
    if let Some(parent) = file_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FetchError::io(parent, e))?;
    }

    let file = File::create(file_path)
        .await
        .map_err(|e| FetchError::io(file_path, e))?;

    let result = stream_to_file(file, response, link, file_path).await;
    if result.is_err() {
        debug!(path = %file_path.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(file_path).await;
    }
    result
}

async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    link: &AudioLink,
    file_path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(link.as_str(), e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(file_path, e))?;

    Ok(bytes_written)
}
