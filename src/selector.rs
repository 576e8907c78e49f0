//! Era/section filtering of the catalog into a flat list of seed URLs.

use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;

/// Era value that selects every seed URL in the catalog.
pub const ALL_ERAS: &str = "all";

/// Errors produced when the requested era or section is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The era is neither `all` nor a catalog key.
    #[error("unsupported era: {0}")]
    UnsupportedEra(String),

    /// The section does not exist under the requested era.
    #[error("unsupported section: {0}")]
    UnsupportedSection(String),
}

/// Checks that `era` and `section` name something in the catalog.
///
/// An empty section means "every section". When `era` is [`ALL_ERAS`] the
/// section is not checked at all.
///
/// # Errors
///
/// Returns [`SelectError::UnsupportedEra`] or
/// [`SelectError::UnsupportedSection`].
pub fn validate(catalog: &Catalog, era: &str, section: &str) -> Result<(), SelectError> {
    if era == ALL_ERAS {
        return Ok(());
    }
    let sections = catalog
        .sections(era)
        .ok_or_else(|| SelectError::UnsupportedEra(era.to_string()))?;
    if !section.is_empty() && !sections.contains_key(section) {
        return Err(SelectError::UnsupportedSection(section.to_string()));
    }
    Ok(())
}

/// Returns the seed URLs matching `era` and `section`, in catalog order.
///
/// # Errors
///
/// Same as [`validate`].
pub fn select(catalog: &Catalog, era: &str, section: &str) -> Result<Vec<String>, SelectError> {
    if era == ALL_ERAS {
        if !section.is_empty() {
            debug!(section, "section filter ignored when every era is selected");
        }
        return Ok(catalog
            .iter()
            .flat_map(|(_, sections)| sections.values().flatten().cloned())
            .collect());
    }

    let sections = catalog
        .sections(era)
        .ok_or_else(|| SelectError::UnsupportedEra(era.to_string()))?;

    if section.is_empty() {
        return Ok(sections.values().flatten().cloned().collect());
    }

    sections
        .get(section)
        .cloned()
        .ok_or_else(|| SelectError::UnsupportedSection(section.to_string()))
}
