use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round a monetary value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The five cost components subtracted from gross revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub product: f64,
    pub marketing: f64,
    pub fulfillment: f64,
    pub processing: f64,
    pub other: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.product + self.marketing + self.fulfillment + self.processing + self.other
    }

    fn rounded(&self) -> Self {
        Self {
            product: round2(self.product),
            marketing: round2(self.marketing),
            fulfillment: round2(self.fulfillment),
            processing: round2(self.processing),
            other: round2(self.other),
        }
    }
}

/// One day of financial metrics for one shop.
///
/// All monetary fields are rounded to 2 decimals. `net_revenue` is derived
/// from the unrounded gross and costs, then rounded once, so
/// `gross - costs.total()` can differ from `net` by a few cents of
/// rounding drift but never more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub shop_id: String,
    pub date: NaiveDate,
    pub gross_revenue: f64,
    pub net_revenue: f64,
    pub costs: CostBreakdown,
}

impl MetricRecord {
    /// Build a record from unrounded values, applying the single rounding pass.
    pub fn from_raw(shop_id: &str, date: NaiveDate, gross: f64, costs: CostBreakdown) -> Self {
        let net = gross - costs.total();
        Self {
            shop_id: shop_id.to_string(),
            date,
            gross_revenue: round2(gross),
            net_revenue: round2(net),
            costs: costs.rounded(),
        }
    }

    /// `YYYY-MM-DD`, the form used in partition paths and payload rows.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
