//! Error types for the remote half of the pipeline.

use std::path::PathBuf;
use std::time::Duration;

use shopmetrics_core::{ConfigError, RegistryError, SynthError, WriteError};
use thiserror::Error;

/// Failures talking to the object store or the query engine.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("upload of {key} failed: {source}")]
    Upload {
        key: String,
        source: object_store::Error,
    },

    #[error("{key:?} is not a valid object key: {source}")]
    InvalidKey {
        key: String,
        source: object_store::path::Error,
    },

    #[error("failed to read local partition file {path}: {source}")]
    LocalRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("object store setup failed: {0}")]
    Store(#[source] object_store::Error),

    #[error("catalog refresh job {job_id} ended {state}: {reason}")]
    CatalogRefresh {
        job_id: String,
        state: String,
        reason: String,
    },

    #[error("catalog refresh job {job_id} still running after {waited:?}")]
    CatalogRefreshTimeout { job_id: String, waited: Duration },

    #[error("wait for catalog refresh job {job_id} was cancelled")]
    CatalogRefreshCancelled { job_id: String },

    #[error("query engine request failed: {0}")]
    QueryRequest(String),

    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Any failure of an end-to-end run, tagged by phase.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("synthesizer error: {0}")]
    Synth(#[from] SynthError),
    #[error("write error: {0}")]
    Write(#[from] WriteError),
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
}
