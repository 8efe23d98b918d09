use super::record::MetricRecord;
use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};

/// The `(date, shop)` pair that decides where a record is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    pub date: NaiveDate,
    pub shop_id: String,
}

impl PartitionKey {
    pub fn of(record: &MetricRecord) -> Self {
        Self {
            date: record.date,
            shop_id: record.shop_id.clone(),
        }
    }

    /// Hive-style relative path: `dt=YYYY-MM-DD/shop_id=<shop>`.
    pub fn relative_dir(&self) -> String {
        format!("dt={}/shop_id={}", self.date.format("%Y-%m-%d"), self.shop_id)
    }

    /// Local directory for this partition under `root`.
    pub fn local_dir(&self, root: &Path) -> PathBuf {
        root.join(format!("dt={}", self.date.format("%Y-%m-%d")))
            .join(format!("shop_id={}", self.shop_id))
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_dir())
    }
}

/// A Parquet file written for one partition in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFile {
    pub key: PartitionKey,
    /// `part-<token>.parquet`
    pub file_name: String,
    pub local_path: PathBuf,
    pub row_count: usize,
}
