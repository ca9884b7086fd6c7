use std::{
    fmt,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use serde::Deserialize;
use time::{
    Date, OffsetDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::{format_description, time},
};

/// `YYYY-MM-DD`, as accepted on the command line and used for directory names.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Last second of a day. Range ends are normalized to this.
const END_OF_DAY: Time = time!(23:59:59);

/// File name of the raw archive inside each run directory.
pub const ARCHIVE_FILE_NAME: &str = "logs.zip";

const WORKFLOW_PATH_PREFIX: &str = ".github/workflows/";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("Malformed workflow run")]
    MalformedRun(#[source] serde_json::Error),
    #[error("Workflow run {id} has invalid created_at '{value}'")]
    InvalidTimestamp {
        id: u64,
        value: String,
        #[source]
        source: time::error::Parse,
    },
}

pub fn parse_date(value: &str) -> Result<Date, ModelError> {
    Date::parse(value.trim(), DATE_FORMAT)
        .map_err(|source| ModelError::InvalidDate { value: value.to_string(), source })
}

/// Inclusive UTC range of run creation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl DateRange {
    /// Covers `start 00:00:00Z` through `end 23:59:59Z`.
    /// A start date after the end date yields a range that matches nothing.
    pub fn new(start: Date, end: Date) -> Self {
        Self { start: start.midnight().assume_utc(), end: end.with_time(END_OF_DAY).assume_utc() }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ModelError> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn is_empty(&self) -> bool { self.start > self.end }

    pub fn start(&self) -> OffsetDateTime { self.start }

    pub fn end(&self) -> OffsetDateTime { self.end }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Value for the `created` search qualifier of the runs endpoint.
    pub fn created_filter(&self) -> String { format!("{}..{}", self.start.date(), self.end.date()) }
}

/// A single workflow run as returned by the runs endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRun {
    pub id: u64,
    /// Always UTC.
    pub created_at: OffsetDateTime,
    pub payload: serde_json::Value,
}

#[derive(Deserialize)]
struct RunFields {
    id: u64,
    created_at: String,
}

impl WorkflowRun {
    pub fn from_json(payload: serde_json::Value) -> Result<Self, ModelError> {
        let RunFields { id, created_at } =
            RunFields::deserialize(&payload).map_err(ModelError::MalformedRun)?;
        let created_at = OffsetDateTime::parse(&created_at, &Rfc3339)
            .map_err(|source| ModelError::InvalidTimestamp { id, value: created_at.clone(), source })?
            .to_offset(UtcOffset::UTC);
        Ok(Self { id, created_at, payload })
    }

    pub fn created_date(&self) -> Date { self.created_at.date() }

    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.format(&Rfc3339).unwrap_or_else(|_| self.created_at.to_string())
    }

    /// `<base>/<YYYY-MM-DD>/run_<id>`
    pub fn output_dir(&self, base: impl AsRef<Path>) -> PathBuf {
        base.as_ref().join(self.created_date().to_string()).join(format!("run_{}", self.id))
    }
}

/// Repository and workflow whose runs are exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTarget {
    pub owner: String,
    pub repo: String,
    /// Workflow file name or numeric ID.
    pub workflow: String,
}

impl WorkflowTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, workflow: &str) -> Self {
        let workflow = workflow.trim();
        let workflow = workflow.strip_prefix(WORKFLOW_PATH_PREFIX).unwrap_or(workflow);
        Self { owner: owner.into(), repo: repo.into(), workflow: workflow.to_string() }
    }
}

impl fmt::Display for WorkflowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.owner, self.repo, self.workflow)
    }
}

/// Downloaded log archive for one run and where it belongs on disk.
#[derive(Debug, Clone)]
pub struct RunArchive {
    pub run_id: u64,
    pub dir: PathBuf,
    pub bytes: Bytes,
}

impl RunArchive {
    pub fn new(base: impl AsRef<Path>, run: &WorkflowRun, bytes: Bytes) -> Self {
        Self { run_id: run.id, dir: run.output_dir(base), bytes }
    }

    pub fn archive_path(&self) -> PathBuf { self.dir.join(ARCHIVE_FILE_NAME) }
}
