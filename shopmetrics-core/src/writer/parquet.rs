//! Hive-partitioned Parquet writer.
//!
//! Layout: `{root}/dt={YYYY-MM-DD}/shop_id={SHOP}/part-{token}.parquet`
//!
//! - Records are grouped by `(date, shop)` in first-seen order
//! - One uncompressed file per group per run; the payload excludes `dt`/`shop_id`
//! - Writes are atomic (write to .tmp, rename into place)
//! - A file name that already exists is never reused

use super::WriteError;
use crate::domain::{CostBreakdown, MetricRecord, PartitionFile, PartitionKey};
use crate::schema::{payload_column_names, PAYLOAD_SCHEMA};
use crate::token::TokenGenerator;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How many fresh tokens to try before giving up on a collision-free name.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Records that share one partition key, in dataset order.
#[derive(Debug)]
pub struct PartitionGroup<'a> {
    pub key: PartitionKey,
    pub records: Vec<&'a MetricRecord>,
}

/// Group records by `(date, shop)`, keeping groups in first-seen order.
pub fn group_by_partition(records: &[MetricRecord]) -> Vec<PartitionGroup<'_>> {
    let mut index: HashMap<PartitionKey, usize> = HashMap::new();
    let mut groups: Vec<PartitionGroup<'_>> = Vec::new();

    for record in records {
        let key = PartitionKey::of(record);
        match index.get(&key) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(PartitionGroup {
                    key,
                    records: vec![record],
                });
            }
        }
    }

    groups
}

/// Writes one Parquet file per partition under a local root.
pub struct PartitionWriter {
    root: PathBuf,
}

impl PartitionWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every partition of `records`. Any failure aborts the whole call;
    /// files written before the failure stay on disk.
    pub fn write_all(
        &self,
        records: &[MetricRecord],
        tokens: &mut dyn TokenGenerator,
    ) -> Result<Vec<PartitionFile>, WriteError> {
        let groups = group_by_partition(records);
        let mut files = Vec::with_capacity(groups.len());

        for group in &groups {
            files.push(self.write_group(group, tokens)?);
        }

        info!(
            root = %self.root.display(),
            partitions = files.len(),
            rows = records.len(),
            "wrote partition files"
        );
        Ok(files)
    }

    fn write_group(
        &self,
        group: &PartitionGroup<'_>,
        tokens: &mut dyn TokenGenerator,
    ) -> Result<PartitionFile, WriteError> {
        let dir = group.key.local_dir(&self.root);
        fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let (file_name, path) = fresh_file_name(&dir, tokens)?;

        let mut df = records_to_dataframe(&group.records).map_err(|e| WriteError::Serialization {
            partition: group.key.to_string(),
            reason: e.to_string(),
        })?;

        write_staged(&path, |tmp| write_uncompressed(&mut df, tmp)).map_err(|e| match e {
            StagedWriteError::Write(reason) => WriteError::Serialization {
                partition: group.key.to_string(),
                reason,
            },
            StagedWriteError::Rename(source) => WriteError::Io {
                path: path.clone(),
                source,
            },
        })?;

        debug!(partition = %group.key, file = %file_name, rows = group.records.len(), "wrote partition");

        Ok(PartitionFile {
            key: group.key.clone(),
            file_name,
            local_path: path,
            row_count: group.records.len(),
        })
    }
}

/// Pick `part-<token>.parquet` that does not already exist in `dir`.
fn fresh_file_name(
    dir: &Path,
    tokens: &mut dyn TokenGenerator,
) -> Result<(String, PathBuf), WriteError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let name = format!("part-{}.parquet", tokens.next_token());
        let path = dir.join(&name);
        if !path.exists() {
            return Ok((name, path));
        }
        debug!(path = %path.display(), "file name taken, drawing another token");
    }
    Err(WriteError::NameCollision {
        dir: dir.to_path_buf(),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

/// Convert records to a DataFrame holding exactly the payload columns.
fn records_to_dataframe(records: &[&MetricRecord]) -> PolarsResult<DataFrame> {
    let shop_ids: Vec<&str> = records.iter().map(|r| r.shop_id.as_str()).collect();
    let dates: Vec<String> = records.iter().map(|r| r.date_string()).collect();
    let numeric = |f: fn(&MetricRecord) -> f64| -> Vec<f64> { records.iter().map(|r| f(r)).collect() };

    let names = payload_column_names();
    DataFrame::new(vec![
        Column::new(names[0].into(), shop_ids),
        Column::new(names[1].into(), dates),
        Column::new(names[2].into(), numeric(|r| r.gross_revenue)),
        Column::new(names[3].into(), numeric(|r| r.net_revenue)),
        Column::new(names[4].into(), numeric(|r| r.costs.product)),
        Column::new(names[5].into(), numeric(|r| r.costs.marketing)),
        Column::new(names[6].into(), numeric(|r| r.costs.fulfillment)),
        Column::new(names[7].into(), numeric(|r| r.costs.processing)),
        Column::new(names[8].into(), numeric(|r| r.costs.other)),
    ])
}

/// Write a DataFrame to a Parquet file without compression.
enum StagedWriteError {
    Write(String),
    Rename(std::io::Error),
}

/// Run `write` against `<path>.tmp`, then rename into place. The tmp file
/// is removed on either failure so readers never see a partial partition.
fn write_staged<F>(path: &Path, write: F) -> Result<(), StagedWriteError>
where
    F: FnOnce(&Path) -> Result<(), String>,
{
    let tmp_path = path.with_extension("parquet.tmp");
    if let Err(reason) = write(&tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StagedWriteError::Write(reason));
    }
    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        StagedWriteError::Rename(source)
    })
}

fn write_uncompressed(df: &mut DataFrame, path: &Path) -> Result<(), String> {
    let file = fs::File::create(path).map_err(|e| format!("create file: {e}"))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Uncompressed)
        .finish(df)
        .map_err(|e| format!("write parquet: {e}"))?;
    Ok(())
}

/// Read one partition file back into records, checking the payload schema.
pub fn read_partition_file(path: &Path) -> Result<Vec<MetricRecord>, WriteError> {
    let read_err = |reason: String| WriteError::Read {
        path: path.to_path_buf(),
        reason,
    };

    let file = fs::File::open(path).map_err(|e| read_err(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| read_err(format!("read: {e}")))?;

    let actual: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
    if actual != payload_column_names() {
        return Err(read_err(format!(
            "unexpected columns {actual:?}, expected {:?}",
            payload_column_names()
        )));
    }

    let col_err = |e: PolarsError| read_err(format!("column read: {e}"));
    let shop_ca = df.column(PAYLOAD_SCHEMA[0].name).map_err(col_err)?.str().map_err(col_err)?;
    let date_ca = df.column(PAYLOAD_SCHEMA[1].name).map_err(col_err)?.str().map_err(col_err)?;
    let mut numeric = Vec::with_capacity(7);
    for field in &PAYLOAD_SCHEMA[2..] {
        numeric.push(df.column(field.name).map_err(col_err)?.f64().map_err(col_err)?);
    }

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let shop_id = shop_ca
            .get(i)
            .ok_or_else(|| read_err(format!("null entity_id at row {i}")))?;
        let raw_date = date_ca
            .get(i)
            .ok_or_else(|| read_err(format!("null metric_date at row {i}")))?;
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| read_err(format!("bad metric_date {raw_date:?} at row {i}: {e}")))?;
        let value = |col: usize| -> Result<f64, WriteError> {
            numeric[col].get(i).ok_or_else(|| {
                read_err(format!("null {} at row {i}", PAYLOAD_SCHEMA[col + 2].name))
            })
        };

        records.push(MetricRecord {
            shop_id: shop_id.to_string(),
            date,
            gross_revenue: value(0)?,
            net_revenue: value(1)?,
            costs: CostBreakdown {
                product: value(2)?,
                marketing: value(3)?,
                fulfillment: value(4)?,
                processing: value(5)?,
                other: value(6)?,
            },
        });
    }

    Ok(records)
}
