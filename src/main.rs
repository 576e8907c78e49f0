//! CLI entry point for the sample-fetch tool.

use anyhow::{Context, Result};
use sample_fetch::{App, Catalog, Config};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse_with_legacy_flags();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON list, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = build_config(&args).context("parsing config")?;
    let app = App::new(config).context("initializing app")?;

    if app.config().download {
        info!(era = %app.config().era, section = %app.config().section, "downloading samples");
    }
    app.run().await?;

    Ok(())
}

fn build_config(args: &Args) -> Result<Config, sample_fetch::ConfigError> {
    let catalog = match &args.catalog {
        Some(path) => {
            debug!(path = %path.display(), "loading catalog file");
            Catalog::from_json_file(path)?
        }
        None => Catalog::builtin(),
    };

    Ok(Config::new(catalog, args.era.as_str(), args.section.as_str())?
        .with_download(args.download)
        .with_output_dir(&args.output_dir))
}
