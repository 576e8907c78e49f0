//! Audio link type and the mapping from a link to its local file path.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use url::Url;

/// File suffixes recognised as downloadable audio (matched case-sensitively).
pub const AUDIO_SUFFIXES: [&str; 3] = [".aif", ".aiff", ".wav"];

/// Returns true if `href` ends with one of [`AUDIO_SUFFIXES`].
///
/// The match is exact: no case folding and no query-string stripping.
#[must_use]
pub fn has_audio_suffix(href: &str) -> bool {
    AUDIO_SUFFIXES.iter().any(|suffix| href.ends_with(suffix))
}

/// An absolute URL to a single downloadable audio file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AudioLink(String);

impl AudioLink {
    /// Wraps an absolute URL, normalizing it when it parses.
    ///
    /// Normalization percent-encodes characters such as spaces and resolves
    /// dot segments, so two spellings of one resource compare equal. A
    /// string that does not parse is kept as given and fails later, when it
    /// is requested.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let raw = url.into();
        match Url::parse(&raw) {
            Ok(parsed) => Self(parsed.into()),
            Err(_) => Self(raw),
        }
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the relative path this link is stored under.
    ///
    /// The URL path is percent-decoded and its leading `/` removed, so
    /// `http://host/dir/file.wav` maps to `dir/file.wav`. Escapes that do
    /// not decode to UTF-8 become U+FFFD. Returns `None` when the URL does
    /// not parse, has an empty path, or the path would leave the output
    /// directory.
    #[must_use]
    pub fn local_path(&self) -> Option<PathBuf> {
        let url = Url::parse(&self.0).ok()?;
        let bytes = urlencoding::decode_binary(url.path().as_bytes());
        let decoded = String::from_utf8_lossy(&bytes);
        let relative = decoded.trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }

        let path = Path::new(relative);
        if !path.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(path.to_path_buf())
    }
}

impl fmt::Display for AudioLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AudioLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
