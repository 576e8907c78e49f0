//! CLI argument definitions using clap derive macros.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// Download instrument sample recordings from catalogued index pages.
///
/// Without `-dl` the selected index page URLs are printed as a JSON array.
#[derive(Parser, Debug)]
#[command(name = "sample-fetch")]
#[command(author, version, about)]
pub struct Args {
    /// Download samples (default is to just print a JSON list to stdout)
    #[arg(
        long = "dl",
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub download: bool,

    /// Filter by era ('all', 'pre-2012', 'post-2012')
    #[arg(short = 'e', long = "era", default_value = "all")]
    pub era: String,

    /// Section within the era (e.g. brass, woodwind, percussion)
    #[arg(short = 's', long = "section", default_value = "")]
    pub section: String,

    /// Directory downloaded samples are written below
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// JSON catalog file to use instead of the built-in one
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parses process arguments, accepting the single-dash `-dl` spelling.
    #[must_use]
    pub fn parse_with_legacy_flags() -> Self {
        Self::parse_from(normalize_legacy_flags(std::env::args_os()))
    }
}

/// Rewrites `-dl` (and `-dl=<value>`) to the long `--dl` form clap expects.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-dl") => OsString::from("--dl"),
            Some(s) if s.starts_with("-dl=") => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}
