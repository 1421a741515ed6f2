//! # News Dedup
//!
//! Collapses duplicate and near-duplicate news articles scraped from several
//! sources into canonical records, each with a timeline of the republished
//! variants it absorbed.
//!
//! ## Usage
//!
//! ```sh
//! news_dedup -i merged.json -o merged_DEDUP.json
//! ```
//!
//! ## Architecture
//!
//! The binary wraps the [`news_dedup`] library:
//! 1. **Loading**: Read the merged document and resolve it to a record list
//! 2. **Deduplication**: Filter, merge by URL and title, cluster by SimHash
//! 3. **Output**: Write the canonical records as one JSON array

use clap::Parser;
use news_dedup::cli::Cli;
use news_dedup::dedup::Deduplicator;
use news_dedup::dedup::serialize::ClusterIdAllocator;
use news_dedup::outputs::json;
use news_dedup::utils::{ensure_writable_dir, is_up_to_date};
use news_dedup::{DedupConfig, inputs};
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_dedup starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = match &args.config {
        Some(path) => DedupConfig::load(path).await?,
        None => DedupConfig::default(),
    };
    if let Some(min_len) = args.min_content_length {
        config.min_content_length = min_len;
    }
    let deduplicator = Deduplicator::new(config)?;
    info!(?deduplicator, "Using engine parameters");

    if !args.must_rerun() && is_up_to_date(&args.input, &args.output).await {
        info!(
            input = %args.input.display(),
            output = %args.output.display(),
            "Output is newer than input; skipping (use --force to re-run)"
        );
        return Ok(());
    }

    // Early check: ensure the output directory is writable
    let output_dir = args
        .output
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Load records ----
    let records = inputs::read_input(&args.input).await?;
    if records.is_empty() {
        warn!(input = %args.input.display(), "No records resolved from input; writing empty output");
        json::write_records(&args.output, &[]).await?;
        return Ok(());
    }

    // ---- Deduplicate ----
    let (output, stats) = deduplicator.run(records, &mut ClusterIdAllocator::new());

    // ---- Write ----
    json::write_records(&args.output, &output).await?;

    let elapsed = start_time.elapsed();
    info!(
        before = stats.before,
        after = stats.after,
        removed = stats.removed,
        removed_short = stats.removed_short,
        output = %args.output.display(),
        "Deduplicated batch written"
    );
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
