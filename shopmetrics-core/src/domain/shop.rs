use serde::{Deserialize, Serialize};

/// One line of the shop registry: a shop identifier and its base daily revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopEntry {
    pub shop_id: String,
    pub base_revenue: f64,
}

impl ShopEntry {
    pub fn new(shop_id: impl Into<String>, base_revenue: f64) -> Self {
        Self {
            shop_id: shop_id.into(),
            base_revenue,
        }
    }
}
