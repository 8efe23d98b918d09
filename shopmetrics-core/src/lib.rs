//! ShopMetrics Core — synthetic per-shop daily financial metrics.
//!
//! This crate covers everything that happens before data leaves the machine:
//! - Shop registry reading (and dummy registry generation)
//! - The daily metric model: seasonal × weekend × Gaussian noise, five cost ratios
//! - Series generation over `shops × days`
//! - Grouping by `(dt, shop_id)` and writing uncompressed Hive-partitioned Parquet
//! - A flat CSV dump for inspection
//! - Run configuration loaded from TOML

pub mod config;
pub mod domain;
pub mod registry;
pub mod rng;
pub mod schema;
pub mod series;
pub mod shops;
pub mod synth;
pub mod token;
pub mod writer;

pub use config::{AppConfig, ConfigError};
pub use domain::{MetricRecord, PartitionFile, PartitionKey, ShopEntry};
pub use registry::{read_registry, read_registry_file, RegistryError};
pub use rng::SeedPolicy;
pub use series::generate_series;
pub use synth::{SynthError, Synthesizer};
pub use token::{SequentialTokens, TokenGenerator, UuidTokens};
pub use writer::{PartitionWriter, WriteError};
