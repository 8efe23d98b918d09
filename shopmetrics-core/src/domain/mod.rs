//! Domain types: registry entries, daily metric records, partition keys.

pub mod partition;
pub mod record;
pub mod shop;

pub use partition::{PartitionFile, PartitionKey};
pub use record::{round2, CostBreakdown, MetricRecord};
pub use shop::ShopEntry;
