//! Local outputs: partitioned Parquet files and the flat CSV dump.

pub mod csv_dump;
pub mod parquet;

pub use csv_dump::write_csv_dump;
pub use parquet::{group_by_partition, read_partition_file, PartitionGroup, PartitionWriter};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize partition {partition}: {reason}")]
    Serialization { partition: String, reason: String },

    #[error("no free file name in {dir} after {attempts} attempts")]
    NameCollision { dir: PathBuf, attempts: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
