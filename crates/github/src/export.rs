use std::{
    fs,
    path::{Path, PathBuf},
};

use actions_logs_core::{
    models::{DateRange, RunArchive, WorkflowRun, WorkflowTarget},
    util::size,
};
use anyhow::{Context, Result};

use crate::{
    GitHub,
    archive::{ExtractStats, save_archive},
};

/// What to export and where to put it.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub target: WorkflowTarget,
    pub range: DateRange,
    pub output_dir: PathBuf,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Runs returned by the API (after the server-side filter).
    pub listed: usize,
    /// Runs inside the requested range.
    pub matched: usize,
    pub saved: usize,
    pub failed: usize,
    /// Total size of the downloaded archives.
    pub bytes: u64,
}

pub struct SavedRun {
    pub dir: PathBuf,
    pub bytes: u64,
    pub stats: ExtractStats,
}

/// List, filter and download in sequence.
///
/// A listing failure is returned before any download starts. Failures for
/// individual runs are logged and counted in the summary.
pub async fn export_logs(github: &GitHub, request: &ExportRequest) -> Result<ExportSummary> {
    let created = request.range.created_filter();
    let runs = github
        .list_workflow_runs(&request.target, Some(&created))
        .await
        .context("Failed to list workflow runs")?;
    let listed = runs.len();
    tracing::info!("{} workflow runs returned for {}", listed, created);

    // The server-side filter works on dates only, check exact instants again
    let runs = filter_runs_by_date(runs, &request.range);
    tracing::info!("{} workflow runs within the requested range", runs.len());

    let mut summary =
        download_and_save_logs(github, &request.target, &runs, &request.output_dir).await;
    summary.listed = listed;
    Ok(summary)
}

/// Keep runs created within `range` (inclusive on both ends), in their original order.
pub fn filter_runs_by_date(runs: Vec<WorkflowRun>, range: &DateRange) -> Vec<WorkflowRun> {
    runs.into_iter()
        .filter(|run| {
            let matched = range.contains(run.created_at);
            if matched {
                tracing::info!("Matched run {} (created {})", run.id, run.created_at_rfc3339());
            }
            matched
        })
        .collect()
}

pub async fn download_and_save_logs(
    github: &GitHub,
    target: &WorkflowTarget,
    runs: &[WorkflowRun],
    output_dir: &Path,
) -> ExportSummary {
    let mut summary = ExportSummary { matched: runs.len(), ..Default::default() };
    for run in runs {
        tracing::info!("Downloading logs for run {}", run.id);
        match save_run_logs(github, target, run, output_dir).await {
            Ok(saved) => {
                tracing::info!(
                    "Saved logs for run {} to {} ({} files, {})",
                    run.id,
                    saved.dir.display(),
                    saved.stats.files,
                    size(saved.bytes)
                );
                summary.saved += 1;
                summary.bytes += saved.bytes;
            }
            Err(e) => {
                tracing::error!("Failed to process logs for run {}: {:?}", run.id, e);
                summary.failed += 1;
            }
        }
    }
    summary
}

pub async fn save_run_logs(
    github: &GitHub,
    target: &WorkflowTarget,
    run: &WorkflowRun,
    output_dir: &Path,
) -> Result<SavedRun> {
    let dir = run.output_dir(output_dir);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let bytes = github
        .download_run_logs(target, run.id)
        .await
        .context("Failed to download log archive")?;
    let archive = RunArchive::new(output_dir, run, bytes);
    let stats = save_archive(&archive)?;
    Ok(SavedRun { dir: archive.dir, bytes: archive.bytes.len() as u64, stats })
}
