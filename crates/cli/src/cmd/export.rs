use std::path::PathBuf;

use actions_logs_core::{
    config::{DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT_SECS, GitHubConfig, TokenError, default_api_url},
    models::{DateRange, WorkflowTarget},
    util::size,
};
use actions_logs_github::{
    GitHub,
    export::{ExportRequest, ExportSummary, export_logs},
};
use anyhow::{Context, Result};
use argp::FromArgs;
use time::Date;
use url::Url;

use crate::util;

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Download GitHub Actions logs for workflow runs created within a date range.
pub struct Args {
    #[argp(option)]
    /// repository owner
    owner: String,
    #[argp(option)]
    /// repository name
    repo: String,
    #[argp(option)]
    /// workflow file name or ID
    workflow: String,
    #[argp(option, from_str_fn(util::date))]
    /// first creation date to include, YYYY-MM-DD (UTC)
    start_date: Date,
    #[argp(option, from_str_fn(util::date))]
    /// last creation date to include, YYYY-MM-DD (UTC, whole day)
    end_date: Date,
    #[argp(option, default = "PathBuf::from(DEFAULT_OUTPUT_DIR)", from_str_fn(util::native_path))]
    /// directory to store logs in
    output_dir: PathBuf,
    #[argp(option, default = "DEFAULT_TIMEOUT_SECS", from_str_fn(util::timeout))]
    /// HTTP request timeout in seconds
    timeout: u64,
    #[argp(option, from_str_fn(util::url))]
    /// proxy URL for both HTTP and HTTPS requests
    proxy: Option<Url>,
    #[argp(option, default = "default_api_url()", from_str_fn(util::url))]
    /// GitHub API base URL
    api_url: Url,
}

/// `token` is the result of looking up the API token, so a missing token is
/// reported the same way as any other fatal error.
pub async fn run(args: Args, token: Result<String, TokenError>) -> Result<ExportSummary> {
    let token = token.context("A GitHub token is required")?;
    let range = DateRange::new(args.start_date, args.end_date);
    if range.is_empty() {
        tracing::warn!(
            "Start date {} is after end date {}, no runs will match",
            args.start_date,
            args.end_date
        );
    }
    let github = GitHub::new(&GitHubConfig {
        token,
        api_url: args.api_url,
        timeout: args.timeout,
        proxy: args.proxy,
    })?;
    let request = ExportRequest {
        target: WorkflowTarget::new(args.owner, args.repo, &args.workflow),
        range,
        output_dir: args.output_dir,
    };
    tracing::info!(
        "Exporting logs for {} created {} through {} to {}",
        request.target,
        args.start_date,
        args.end_date,
        request.output_dir.display()
    );

    let summary = export_logs(&github, &request).await?;
    tracing::info!(
        "Done: {} runs listed, {} matched, {} saved, {} failed ({} downloaded)",
        summary.listed,
        summary.matched,
        summary.saved,
        summary.failed,
        size(summary.bytes)
    );
    Ok(summary)
}
