//! ShopMetrics Publish — pushing generated partitions to remote services.
//!
//! Builds on `shopmetrics-core` to provide:
//! - Object key composition (`<prefix>/dt=<date>/shop_id=<shop>/<file>`)
//! - A blocking object-store facade (S3, local mirror, in-memory)
//! - Sequential fail-fast partition upload
//! - Catalog refresh with bounded, cancellable polling
//! - An Athena-compatible query engine client with SigV4 signing
//! - The end-to-end pipeline and its run summary

pub mod athena;
pub mod catalog;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod sigv4;
pub mod store;
pub mod upload;

pub use athena::AthenaClient;
pub use catalog::{
    refresh_catalog, CancelToken, QueryEngine, QueryState, QueryStatus, RepairRequest, WaitOptions,
};
pub use error::{PipelineError, PublishError};
pub use keys::{normalize_prefix, object_key};
pub use pipeline::{generate_local, run_pipeline, LocalOutput, Remotes, RunOptions, RunSummary};
pub use store::BlockingStore;
pub use upload::upload_partitions;
