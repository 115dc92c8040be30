//! # Feed Triage
//!
//! Admits news links scraped from Google News into a persistent reading
//! list, and optionally summarizes what got in.
//!
//! ## Usage
//!
//! ```sh
//! feed_triage --rss-feed "https://news.google.com/rss/search?q=housing" -s ./state -j ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Gathering**: read candidates from a scrape export and/or RSS feeds
//! 2. **Admission**: skip decided titles, reject on negative keywords, resolve
//!    Google News redirect links to their destination, reject on the final URL
//! 3. **Persistence**: write the seen/rejected title ledgers back
//! 4. **Summaries**: fetch accepted article text and summarize it in batches
//! 5. **Output**: write a JSON run report

use awful_aj::{config, config_dir, template};
use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod admission;
mod api;
mod cli;
mod content;
mod filter;
mod ledger;
mod models;
mod outputs;
mod resolver;
mod sources;
mod summary;
mod utils;

use admission::Admission;
use cli::Cli;
use filter::KeywordFilter;
use ledger::{TitleLedger, load_negative_keywords};
use models::{Candidate, RunReport};
use outputs::json;
use resolver::{Endpoints, GoogleNewsResolver};
use utils::{browser_client, ensure_writable_dir};

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
    info!("feed_triage starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Early check: both directories must be writable before any network work
    for dir in [&args.state_dir, &args.json_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Directory is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    let state_dir = Path::new(&args.state_dir);
    let mut ledger = TitleLedger::load(state_dir).await?;
    let keywords = load_negative_keywords(state_dir).await?;
    let keyword_filter = KeywordFilter::new(&keywords)?;
    info!(
        seen = ledger.seen().len(),
        rejected = ledger.rejected().len(),
        keywords = keyword_filter.len(),
        "Loaded state"
    );

    let client = browser_client(Duration::from_secs(args.request_timeout_secs))?;

    // ---- Gather candidates ----
    let candidates = gather_candidates(&args, &client).await?;
    info!(count = candidates.len(), "Total candidates to triage");

    // ---- Admission ----
    let resolver = GoogleNewsResolver::new(client.clone(), Endpoints::default())
        .with_interval(args.resolve_interval_ms.map(Duration::from_millis));
    let report = Admission::new(&keyword_filter, &resolver)
        .with_concurrency(args.concurrency)
        .admit(&candidates, &mut ledger)
        .await;

    ledger.save(state_dir).await?;

    // ---- Summaries ----
    let digests = if args.skip_summary || report.accepted.is_empty() {
        info!(skip_summary = args.skip_summary, "Skipping summaries");
        Vec::new()
    } else {
        let texts = content::fetch_articles(&client, report.accepted.clone(), args.concurrency).await;

        let template = template::load_template(&args.template).await?;
        info!(template = %args.template, "Loaded template");
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => config_dir()?.join("config.yaml").to_string_lossy().into_owned(),
        };
        let config = config::load_config(&config_path)?;
        info!(%config_path, "Loaded configuration");

        let asker = api::retrying_client(&config, &template);
        summary::summarize(&asker, &texts, args.summary_batch_size).await
    };

    // ---- Run report ----
    let now = Local::now();
    let run_report = RunReport {
        local_date: now.date_naive().to_string(),
        local_time: now.format("%H:%M:%S").to_string(),
        candidates: candidates.len(),
        accepted: report.accepted,
        rejected_titles: report.rejected_titles,
        digests,
    };
    if let Err(e) = json::write_run_report(&run_report, Path::new(&args.json_output_dir)).await {
        error!(error = %e, "Failed to write run report");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Collect candidates from the scrape export and every RSS feed, in that
/// order. A feed that fails is logged and skipped; an unreadable export is
/// fatal.
async fn gather_candidates(args: &Cli, client: &reqwest::Client) -> Result<Vec<Candidate>, Box<dyn Error>> {
    let mut candidates = Vec::new();

    if let Some(path) = &args.candidates {
        candidates.extend(sources::load_candidate_file(Path::new(path)).await?);
    }

    let max_age = chrono::Duration::hours(args.max_age_hours);
    for feed in &args.rss_feeds {
        match sources::fetch_rss_candidates(client, feed, max_age).await {
            Ok(items) => candidates.extend(items),
            Err(e) => warn!(%feed, error = %e, "Failed to read feed; skipping"),
        }
    }

    if args.candidates.is_none() && args.rss_feeds.is_empty() {
        warn!("No candidate file or RSS feed given; nothing to triage");
    }

    Ok(candidates)
}
