//! JSON run reports.
//!
//! One file per run, grouped by local date and named after the local time
//! the run started, so several runs a day never overwrite each other.

use crate::models::RunReport;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`RunReport`] to `{json_output_dir}/{local_date}/{HH-MM-SS}.json`.
///
/// Returns the path that was written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_run_report(
    report: &RunReport,
    json_output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = json_output_dir.join(&report.local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(format!("{}.json", report.local_time.replace(':', "-")));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), "Wrote run report");

    Ok(output_json_filename)
}
