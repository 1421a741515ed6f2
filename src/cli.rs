//! Command-line interface definitions for News Dedup.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Input and output paths can also come from environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Dedup application.
///
/// # Examples
///
/// ```sh
/// # Use the default pipeline paths
/// news_dedup
///
/// # Explicit paths, re-running even if the output is fresh
/// news_dedup -i merged.json -o merged_DEDUP.json --force
///
/// # Tuned engine parameters
/// news_dedup -c dedup.yaml --min-content-length 80
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Merged scrape document to deduplicate
    #[arg(
        short,
        long,
        env = "NEWS_DEDUP_INPUT",
        default_value = "data/processed/news_merge/cna_ey_moi_pts.json"
    )]
    pub input: PathBuf,

    /// Where to write the deduplicated array
    #[arg(
        short,
        long,
        env = "NEWS_DEDUP_OUTPUT",
        default_value = "data/processed/news_merge/cna_ey_moi_pts_DEDUP.json"
    )]
    pub output: PathBuf,

    /// Optional path to a YAML file with engine parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Minimum trimmed body length in characters (overrides the config file)
    #[arg(long)]
    pub min_content_length: Option<usize>,

    /// Run even when the output is newer than the input
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Whether this run must ignore an up-to-date output.
    ///
    /// The output does not record which parameters produced it, so a config
    /// file or length override also forces a re-run.
    pub fn must_rerun(&self) -> bool {
        self.force || self.config.is_some() || self.min_content_length.is_some()
    }
}
