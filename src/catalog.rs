//! Static catalog of sample index pages, grouped by era and instrument section.
//!
//! The catalog is an immutable value built once at startup and passed to the
//! selector explicitly. It serializes as a plain JSON object
//! (`{"era": {"section": ["url", ...]}}`) so a custom catalog can be supplied
//! from a file instead of the built-in one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host serving the University of Iowa musical instrument sample pages.
const MIS_BASE: &str = "http://theremin.music.uiowa.edu";

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("IO error reading catalog {path}: {source}")]
    Io {
        /// Path of the catalog file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog text is not a valid era/section/url mapping.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Era → section → seed URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    eras: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Catalog {
    /// Builds a catalog from an already assembled mapping.
    #[must_use]
    pub fn new(eras: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> Self {
        Self { eras }
    }

    /// Returns the built-in University of Iowa MIS catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let pre_2012 = [
            (
                "woodwind",
                &[
                    "MISflute.html",
                    "MISaltoflute.html",
                    "MISbassflute.html",
                    "MISoboe.html",
                    "MISEbclarinet.html",
                    "MISBbclarinet.html",
                    "MISbassclarinet.html",
                    "MISbassoon.html",
                    "MISsopranosaxophone.html",
                    "MISaltosaxophone.html",
                ][..],
            ),
            (
                "brass",
                &[
                    "MISFrenchhorn.html",
                    "MISBbtrumpet.html",
                    "MIStenortrombone.html",
                    "MISbasstrombone.html",
                    "MIStuba.html",
                ][..],
            ),
            (
                "strings",
                &[
                    "MISviolin.html",
                    "MISviola.html",
                    "MIScello.html",
                    "MISdoublebass.html",
                    "MISviolin2012.html",
                    "MISviola2012.html",
                    "MIScello2012.html",
                    "MISdoublebass2012.html",
                ][..],
            ),
            (
                "percussion",
                &[
                    "Mismarimba.html",
                    "MISxylophone.html",
                    "Misvibraphone.html",
                    "MISbells.html",
                    "MIScrotales.html",
                    "MISgongtamtams.html",
                    "MIShandpercussion.html",
                    "MIStambourines.html",
                ][..],
            ),
            (
                "piano/other",
                &[
                    "MISpiano.html",
                    "MISballoonpop.html",
                    "MISguitar.html",
                ][..],
            ),
            ("foundobjects", &["MISfoundobjects1.html"][..]),
        ];

        let post_2012 = [
            (
                "woodwinds",
                &[
                    "MIS-Pitches-2012/MISFlute2012.html",
                    "MIS-Pitches-2012/MISaltoflute2012.html",
                    "MIS-Pitches-2012/MISBassFlute2012.html",
                    "MIS-Pitches-2012/MISOboe2012.html",
                    "MIS-Pitches-2012/MISEbClarinet2012.html",
                    "MIS-Pitches-2012/MISBbClarinet2012.html",
                    "MIS-Pitches-2012/MISBbBassClarinet2012.html",
                    "MIS-Pitches-2012/MISBassoon2012.html",
                    "MIS-Pitches-2012/MISBbSopranoSaxophone2012.html",
                    "MIS-Pitches-2012/MISEbAltoSaxophone2012.html",
                ][..],
            ),
            (
                "brass",
                &[
                    "MIS-Pitches-2012/MISHorn2012.html",
                    "MIS-Pitches-2012/MISBbTrumpet2012.html",
                    "MIS-Pitches-2012/MISTenorTrombone2012.html",
                    "MIS-Pitches-2012/MISBassTrombone2012.html",
                    "MIS-Pitches-2012/MISTuba2012.html",
                    "MIS-Pitches-2012/MISBbBassClarinet2012.html",
                    "MIS-Pitches-2012/MISBassoon2012.html",
                    "MIS-Pitches-2012/MISBbSopranoSaxophone2012.html",
                    "MIS-Pitches-2012/MISEbAltoSaxophone2012.html",
                ][..],
            ),
            (
                "strings",
                &[
                    "MIS-Pitches-2012/MISViolin2012.html",
                    "MIS-Pitches-2012/MISViola2012.html",
                    "MIS-Pitches-2012/MISCello2012.html",
                    "MIS-Pitches-2012/MISDoubleBass2012.html",
                ][..],
            ),
            (
                "percussion",
                &[
                    "MIS-Pitches-2012/MISMarimba2012.html",
                    "MIS-Pitches-2012/MISxylophone2012.html",
                    "MIS-Pitches-2012/MISVibraphone2012.html",
                    "MIS-Pitches-2012/MISBells2012.html",
                    "MIS-Pitches-2012/MISCrotales2012.html",
                    "MIS-Pitches-2012/MISCymbals2012.html",
                    "MIS-Pitches-2012/MISGongsTamTams2012.html",
                    "MIS-Pitches-2012/MISHandPercussion2012.html",
                    "MIS-Pitches-2012/MISTambourines2012.html",
                ][..],
            ),
            ("foundobjects", &["MISfoundobjects2.html"][..]),
        ];

        let mut eras = BTreeMap::new();
        eras.insert("pre-2012".to_string(), build_sections(&pre_2012));
        eras.insert("post-2012".to_string(), build_sections(&post_2012));
        Self { eras }
    }

    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if the text is not an
    /// era → section → url-list object.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a catalog JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read and
    /// [`CatalogError::Json`] if its content is malformed.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Returns the sections of `era`, if the era exists.
    #[must_use]
    pub fn sections(&self, era: &str) -> Option<&BTreeMap<String, Vec<String>>> {
        self.eras.get(era)
    }

    /// Iterates over era names in catalog order.
    pub fn eras(&self) -> impl Iterator<Item = &str> {
        self.eras.keys().map(String::as_str)
    }

    /// Iterates over every `(era, sections)` pair in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Vec<String>>)> {
        self.eras.iter().map(|(era, sections)| (era.as_str(), sections))
    }

    /// Total number of seed URLs across all eras and sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.eras
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Returns true if the catalog holds no seed URLs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_sections(sections: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    sections
        .iter()
        .map(|(name, pages)| {
            let urls = pages.iter().map(|page| format!("{MIS_BASE}/{page}")).collect();
            ((*name).to_string(), urls)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_both_eras() {
        let catalog = Catalog::builtin();
        let eras: Vec<&str> = catalog.eras().collect();
        assert_eq!(eras, vec!["post-2012", "pre-2012"]);
    }

    #[test]
    fn test_builtin_section_names() {
        let catalog = Catalog::builtin();
        let pre: Vec<&String> = catalog.sections("pre-2012").unwrap().keys().collect();
        assert_eq!(
            pre,
            vec![
                "brass",
                "foundobjects",
                "percussion",
                "piano/other",
                "strings",
                "woodwind"
            ]
        );
        let post: Vec<&String> = catalog.sections("post-2012").unwrap().keys().collect();
        assert_eq!(
            post,
            vec!["brass", "foundobjects", "percussion", "strings", "woodwinds"]
        );
    }

    #[test]
    fn test_builtin_len_counts_every_url() {
        // pre-2012: 10 + 5 + 8 + 8 + 3 + 1, post-2012: 10 + 9 + 4 + 9 + 1
        assert_eq!(Catalog::builtin().len(), 35 + 33);
    }

    #[test]
    fn test_builtin_urls_are_absolute() {
        let catalog = Catalog::builtin();
        let brass = &catalog.sections("pre-2012").unwrap()["brass"];
        assert_eq!(brass[0], "http://theremin.music.uiowa.edu/MISFrenchhorn.html");
        let woodwinds = &catalog.sections("post-2012").unwrap()["woodwinds"];
        assert_eq!(
            woodwinds[0],
            "http://theremin.music.uiowa.edu/MIS-Pitches-2012/MISFlute2012.html"
        );
    }

    #[test]
    fn test_unknown_era_has_no_sections() {
        assert!(Catalog::builtin().sections("baroque").is_none());
    }

    #[test]
    fn test_from_json_str_parses_nested_object() {
        let catalog = Catalog::from_json_str(
            r#"{"modern": {"synth": ["http://a/1.html", "http://a/2.html"]}}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.sections("modern").unwrap()["synth"][1], "http://a/2.html");
    }

    #[test]
    fn test_from_json_str_rejects_wrong_shape() {
        let err = Catalog::from_json_str(r#"{"modern": ["http://a/1.html"]}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_from_json_file_missing_reports_path() {
        let err = Catalog::from_json_file(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let json = serde_json::to_string(&Catalog::builtin()).unwrap();
        assert!(json.starts_with(r#"{"post-2012":{"brass":["#));
        assert_eq!(Catalog::from_json_str(&json).unwrap(), Catalog::builtin());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.eras().count(), 0);
    }
}
