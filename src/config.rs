//! Run configuration: mode, era/section filter, output location and catalog.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::selector::{self, ALL_ERAS, SelectError};

/// Errors detected while building a [`Config`], before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The era or section filter does not match the catalog.
    #[error(transparent)]
    Select(#[from] SelectError),

    /// A custom catalog could not be loaded.
    #[error("loading catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Download samples instead of listing seed pages.
    pub download: bool,
    /// Era filter, or `all`.
    pub era: String,
    /// Section filter; empty means every section of the era.
    pub section: String,
    /// Directory downloaded files are written below.
    pub output_dir: PathBuf,
    /// Era → section → seed page URLs.
    pub catalog: Catalog,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Creates a list-mode configuration writing to the current directory,
    /// after checking `era` and `section` against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Select`] if the era or section is unknown.
    pub fn new(
        catalog: Catalog,
        era: impl Into<String>,
        section: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let era = era.into();
        let section = section.into();
        selector::validate(&catalog, &era, &section)?;
        Ok(Self {
            download: false,
            era,
            section,
            output_dir: default_output_dir(),
            catalog,
        })
    }

    /// Sets download mode.
    #[must_use]
    pub fn with_download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

impl Default for Config {
    /// Built-in catalog, every era, list mode.
    fn default() -> Self {
        Self {
            download: false,
            era: ALL_ERAS.to_string(),
            section: String::new(),
            output_dir: default_output_dir(),
            catalog: Catalog::builtin(),
        }
    }
}
