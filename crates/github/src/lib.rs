pub mod archive;
pub mod export;

use actions_logs_core::{
    config::GitHubConfig,
    models::{WorkflowRun, WorkflowTarget},
    util::UrlExt,
};
use anyhow::{Context, Result, bail};
use bytes::Bytes;
use reqwest::{
    Client, Proxy,
    header::{self, HeaderMap, HeaderValue},
};
use url::Url;

const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("actions-logs/", env!("CARGO_PKG_VERSION"));

/// Page size used when listing workflow runs (the API maximum).
pub const RUNS_PER_PAGE: u8 = 100;

/// REST client for the GitHub Actions endpoints.
#[derive(Clone)]
pub struct GitHub {
    client: Client,
    api_url: Url,
}

#[derive(serde::Serialize)]
struct PageParams<'a> {
    per_page: u8,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<&'a str>,
}

/// A missing or null `workflow_runs` counts as an empty page.
#[derive(serde::Deserialize)]
struct WorkflowRunsPage {
    #[serde(default)]
    workflow_runs: Option<Vec<serde_json::Value>>,
}

impl GitHub {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        if config.api_url.cannot_be_a_base() {
            bail!("Invalid API URL {}", config.api_url);
        }
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .context("GitHub token contains invalid characters")?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout_duration());
        if let Some(proxy) = &config.proxy {
            // Don't echo the proxy URL, it may carry credentials
            builder = builder.proxy(Proxy::all(proxy.as_str()).context("Invalid proxy URL")?);
            tracing::info!("Using proxy {}", proxy.host_str().unwrap_or_default());
        }
        let client = builder.build().context("Failed to create GitHub client")?;
        Ok(Self { client, api_url: config.api_url.clone() })
    }

    pub fn api_url(&self) -> &Url { &self.api_url }

    /// Fetch every run of a workflow, page by page, until a page comes back empty.
    ///
    /// `created` is passed through as the server-side `created` qualifier
    /// (`YYYY-MM-DD..YYYY-MM-DD`). Any failure aborts the whole listing.
    pub async fn list_workflow_runs(
        &self,
        target: &WorkflowTarget,
        created: Option<&str>,
    ) -> Result<Vec<WorkflowRun>> {
        let url = self.api_url.with_segments([
            "repos",
            target.owner.as_str(),
            target.repo.as_str(),
            "actions",
            "workflows",
            target.workflow.as_str(),
            "runs",
        ]);
        if let Some(created) = created {
            tracing::info!("Applying created filter {}", created);
        }
        let mut runs = vec![];
        let mut page = 1u32;
        loop {
            let items = self
                .fetch_runs_page(&url, page, created)
                .await
                .with_context(|| format!("Failed to fetch workflow runs page {page}"))?;
            if items.is_empty() {
                break;
            }
            tracing::info!("Page {}: {} runs", page, items.len());
            runs.reserve(items.len());
            for item in items {
                let run = WorkflowRun::from_json(item)
                    .with_context(|| format!("Invalid workflow run on page {page}"))?;
                runs.push(run);
            }
            page += 1;
        }
        tracing::info!("Fetched {} runs for {}", runs.len(), target);
        Ok(runs)
    }

    async fn fetch_runs_page(
        &self,
        url: &Url,
        page: u32,
        created: Option<&str>,
    ) -> Result<Vec<serde_json::Value>> {
        tracing::debug!("GET {} (page {})", url.path_and_query(), page);
        let response = self
            .client
            .get(url.clone())
            .query(&PageParams { per_page: RUNS_PER_PAGE, page, created })
            .send()
            .await?
            .error_for_status()?;
        let body: WorkflowRunsPage = response.json().await?;
        Ok(body.workflow_runs.unwrap_or_default())
    }

    /// Download the ZIP log archive of a single run.
    pub async fn download_run_logs(&self, target: &WorkflowTarget, run_id: u64) -> Result<Bytes> {
        let run_id = run_id.to_string();
        let url = self.api_url.with_segments([
            "repos",
            target.owner.as_str(),
            target.repo.as_str(),
            "actions",
            "runs",
            run_id.as_str(),
            "logs",
        ]);
        tracing::debug!("GET {}", url.path_and_query());
        let bytes = self.client.get(url).send().await?.error_for_status()?.bytes().await?;
        Ok(bytes)
    }
}
