//! In-process stand-in for the GitHub Actions REST API.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::{Cursor, Write},
    sync::{Arc, Mutex},
    time::Duration,
};

use actions_logs_core::config::GitHubConfig;
use actions_logs_github::GitHub;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use url::Url;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

pub const TOKEN: &str = "test-token";

pub enum LogResponse {
    Archive(Vec<u8>),
    Status(StatusCode),
    Delayed(Duration, Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub uri: Uri,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
pub struct StubApi {
    /// Response bodies for `page=1..`; pages past the end are empty.
    pub pages: Vec<Result<Value, StatusCode>>,
    pub logs: HashMap<u64, LogResponse>,
    list_requests: Mutex<Vec<RecordedRequest>>,
    log_requests: Mutex<Vec<u64>>,
}

impl StubApi {
    pub fn new() -> Self { Self::default() }

    pub fn page(self, runs: Vec<Value>) -> Self {
        self.raw_page(json!({ "total_count": runs.len(), "workflow_runs": runs }))
    }

    pub fn raw_page(mut self, body: Value) -> Self {
        self.pages.push(Ok(body));
        self
    }

    pub fn failing_page(mut self, status: StatusCode) -> Self {
        self.pages.push(Err(status));
        self
    }

    pub fn logs(mut self, run_id: u64, response: LogResponse) -> Self {
        self.logs.insert(run_id, response);
        self
    }

    pub fn list_requests(&self) -> Vec<RecordedRequest> { self.list_requests.lock().unwrap().clone() }

    /// Run IDs in the order their logs were requested.
    pub fn log_requests(&self) -> Vec<u64> { self.log_requests.lock().unwrap().clone() }
}

pub fn run_json(id: u64, created_at: &str) -> Value {
    json!({
        "id": id,
        "name": "build",
        "status": "completed",
        "conclusion": "success",
        "created_at": created_at,
        "updated_at": created_at,
    })
}

pub fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Serve `stub` on an ephemeral local port and return its base URL.
pub async fn serve(stub: StubApi) -> (Arc<StubApi>, Url) {
    let stub = Arc::new(stub);
    let app = Router::new()
        .route("/repos/{owner}/{repo}/actions/workflows/{workflow}/runs", get(list_runs))
        .route("/repos/{owner}/{repo}/actions/runs/{run_id}/logs", get(run_logs))
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (stub, Url::parse(&format!("http://{addr}")).unwrap())
}

pub fn client(api_url: &Url) -> GitHub {
    let mut config = GitHubConfig::new(TOKEN.to_string());
    config.api_url = api_url.clone();
    GitHub::new(&config).unwrap()
}

async fn list_runs(
    State(stub): State<Arc<StubApi>>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let page = query.get("page").and_then(|p| p.parse::<usize>().ok()).unwrap_or(1);
    stub.list_requests.lock().unwrap().push(RecordedRequest { uri, query, headers });
    match page.checked_sub(1).and_then(|i| stub.pages.get(i)) {
        Some(Ok(body)) => Json(body.clone()).into_response(),
        Some(Err(status)) => (*status, Json(json!({ "message": "Server Error" }))).into_response(),
        None => Json(json!({ "total_count": 0, "workflow_runs": [] })).into_response(),
    }
}

async fn run_logs(
    State(stub): State<Arc<StubApi>>,
    Path((_owner, _repo, run_id)): Path<(String, String, u64)>,
) -> Response {
    stub.log_requests.lock().unwrap().push(run_id);
    match stub.logs.get(&run_id) {
        Some(LogResponse::Archive(bytes)) => bytes.clone().into_response(),
        Some(LogResponse::Status(status)) => (*status, "error").into_response(),
        Some(LogResponse::Delayed(delay, bytes)) => {
            tokio::time::sleep(*delay).await;
            bytes.clone().into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
