//! Command-line interface definitions for Feed Triage.
//!
//! All arguments can be provided via command-line flags; the feed list can
//! also come from the environment.

use crate::admission::DEFAULT_CONCURRENCY;
use crate::summary::DEFAULT_BATCH_SIZE;
use clap::Parser;

/// Command-line arguments for the Feed Triage application.
///
/// # Examples
///
/// ```sh
/// # Admit an offline scrape export, no summaries
/// feed_triage -c scrape.yaml -s ./state -j ./reports --skip-summary
///
/// # Read two Google News feeds and summarize what gets through
/// feed_triage --rss-feed "$FEED_A" --rss-feed "$FEED_B" -s ./state -j ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML or JSON file with a list of {title, url} candidates
    #[arg(short, long)]
    pub candidates: Option<String>,

    /// Google News RSS feed to read candidates from (repeatable)
    #[arg(long = "rss-feed", env = "FEED_TRIAGE_RSS")]
    pub rss_feeds: Vec<String>,

    /// Ignore RSS items published longer ago than this
    #[arg(long, default_value_t = 3)]
    pub max_age_hours: i64,

    /// Directory holding the seen/rejected title ledgers and negative keywords
    #[arg(short, long)]
    pub state_dir: String,

    /// Output directory for the JSON run reports
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Pause between the parameter fetch and the exchange call, in milliseconds
    #[arg(long)]
    pub resolve_interval_ms: Option<u64>,

    /// Number of links resolved or fetched at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub request_timeout_secs: u64,

    /// Stop after admission; don't fetch content or call the LLM
    #[arg(long)]
    pub skip_summary: bool,

    /// Name of the awful_aj template used for summaries
    #[arg(long, default_value = "feed_triage")]
    pub template: String,

    /// Optional path to the awful_aj config.yaml file
    #[arg(long)]
    pub config: Option<String>,

    /// Articles per summary request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub summary_batch_size: usize,
}
