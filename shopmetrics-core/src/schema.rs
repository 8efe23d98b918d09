//! Parquet payload contract for partition files.
//!
//! The partition key (`dt`, `shop_id`) lives only in the directory path and
//! is never written as a payload column. Column order is fixed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    Utf8,
    Float64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: &'static str,
    pub dtype: SchemaType,
}

const fn field(name: &'static str, dtype: SchemaType) -> SchemaField {
    SchemaField { name, dtype }
}

pub const PAYLOAD_SCHEMA: &[SchemaField] = &[
    field("entity_id", SchemaType::Utf8),
    field("metric_date", SchemaType::Utf8),
    field("gross_revenue", SchemaType::Float64),
    field("net_revenue", SchemaType::Float64),
    field("product_costs", SchemaType::Float64),
    field("marketing_costs", SchemaType::Float64),
    field("fulfillment_costs", SchemaType::Float64),
    field("processing_fees", SchemaType::Float64),
    field("other_costs", SchemaType::Float64),
];

/// Path-only partition columns; must never appear in [`PAYLOAD_SCHEMA`].
pub const PARTITION_COLUMNS: &[&str] = &["dt", "shop_id"];

pub fn payload_column_names() -> Vec<&'static str> {
    PAYLOAD_SCHEMA.iter().map(|f| f.name).collect()
}
