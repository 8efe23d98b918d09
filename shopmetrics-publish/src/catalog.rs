//! Catalog refresh: submit `MSCK REPAIR TABLE` and poll it to a terminal state.
//!
//! The wait is bounded by [`WaitOptions::timeout`] and can be cut short from
//! another thread through a [`CancelToken`]. Neither a timeout nor a
//! cancellation stops the remote job; they only stop waiting for it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use shopmetrics_core::config::CatalogConfig;
use tracing::{debug, info};

use crate::error::PublishError;

/// Query engine job states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryState {
    pub fn parse(s: &str) -> Result<Self, PublishError> {
        match s {
            "QUEUED" => Ok(Self::Queued),
            "RUNNING" => Ok(Self::Running),
            "SUCCEEDED" => Ok(Self::Succeeded),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(PublishError::QueryRequest(format!(
                "unknown query state {other:?}"
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    pub state: QueryState,
    /// Engine-reported reason for the last state change, if any.
    pub reason: Option<String>,
}

impl QueryStatus {
    pub fn new(state: QueryState) -> Self {
        Self { state, reason: None }
    }

    pub fn with_reason(state: QueryState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: Some(reason.into()),
        }
    }
}

/// A repair statement plus everything the engine needs to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairRequest {
    pub statement: String,
    pub database: String,
    pub workgroup: String,
    pub output_location: String,
    /// Idempotency token for the submission.
    pub client_token: String,
}

impl RepairRequest {
    /// `config.table` is assumed validated as a plain identifier.
    pub fn for_table(config: &CatalogConfig) -> Self {
        Self {
            statement: format!("MSCK REPAIR TABLE {}", config.table),
            database: config.database.clone(),
            workgroup: config.workgroup.clone(),
            output_location: config.output_location.clone(),
            client_token: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Remote query engine: submit a statement, look up a job.
pub trait QueryEngine {
    /// Submit the statement; returns the engine's job id.
    fn start_query(&self, request: &RepairRequest) -> Result<String, PublishError>;

    fn query_status(&self, job_id: &str) -> Result<QueryStatus, PublishError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl WaitOptions {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

/// Shared flag that stops a catalog wait at its next check.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Submit `request` and poll until the job is terminal. Returns the job id
/// on SUCCEEDED.
///
/// The deadline and the cancel token are checked before every poll. A failed
/// status fetch ends the wait immediately.
pub fn refresh_catalog(
    engine: &dyn QueryEngine,
    request: &RepairRequest,
    wait: &WaitOptions,
    cancel: &CancelToken,
) -> Result<String, PublishError> {
    let job_id = engine.start_query(request)?;
    info!(job_id = %job_id, statement = %request.statement, "submitted catalog refresh");

    let started = Instant::now();
    let deadline = started + wait.timeout;
    let mut polls = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(PublishError::CatalogRefreshCancelled { job_id });
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(PublishError::CatalogRefreshTimeout {
                job_id,
                waited: now - started,
            });
        }

        let status = engine.query_status(&job_id)?;
        polls += 1;
        debug!(job_id = %job_id, poll = polls, state = %status.state, "polled catalog refresh");

        match status.state {
            QueryState::Succeeded => {
                info!(job_id = %job_id, polls, elapsed = ?started.elapsed(), "catalog refresh succeeded");
                return Ok(job_id);
            }
            QueryState::Failed | QueryState::Cancelled => {
                return Err(PublishError::CatalogRefresh {
                    job_id,
                    state: status.state.to_string(),
                    reason: status.reason.unwrap_or_else(|| "no reason reported".into()),
                });
            }
            QueryState::Queued | QueryState::Running => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                std::thread::sleep(wait.poll_interval.min(remaining));
            }
        }
    }
}
