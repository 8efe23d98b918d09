//! Flat CSV dump of the full dataset, partition helper columns included.
//! Meant for eyeballing a run, not for the query engine.

use super::WriteError;
use crate::domain::MetricRecord;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct CsvRow<'a> {
    entity_id: &'a str,
    metric_date: String,
    gross_revenue: f64,
    net_revenue: f64,
    product_costs: f64,
    marketing_costs: f64,
    fulfillment_costs: f64,
    processing_fees: f64,
    other_costs: f64,
    dt: String,
    shop_id: &'a str,
}

impl<'a> From<&'a MetricRecord> for CsvRow<'a> {
    fn from(r: &'a MetricRecord) -> Self {
        let date = r.date_string();
        Self {
            entity_id: &r.shop_id,
            metric_date: date.clone(),
            gross_revenue: r.gross_revenue,
            net_revenue: r.net_revenue,
            product_costs: r.costs.product,
            marketing_costs: r.costs.marketing,
            fulfillment_costs: r.costs.fulfillment,
            processing_fees: r.costs.processing,
            other_costs: r.costs.other,
            dt: date,
            shop_id: &r.shop_id,
        }
    }
}

/// Write every record to `path` (header row first), creating parent dirs.
pub fn write_csv_dump(records: &[MetricRecord], path: &Path) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush().map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
