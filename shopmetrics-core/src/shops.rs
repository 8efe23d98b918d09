//! Dummy shop registry generation.
//!
//! Produces registry lines in the same `shop_id,base_revenue` format the
//! reader consumes, e.g. `trueprofit-dummy-03-k2x9.myshopify.com,48211.07`.

use crate::domain::{round2, ShopEntry};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct DummyShopOptions {
    pub count: usize,
    pub name_prefix: String,
    pub domain_suffix: String,
    pub min_revenue: f64,
    pub max_revenue: f64,
}

impl Default for DummyShopOptions {
    fn default() -> Self {
        Self {
            count: 10,
            name_prefix: "trueprofit-dummy".into(),
            domain_suffix: ".myshopify.com".into(),
            min_revenue: 500.0,
            max_revenue: 100_000.0,
        }
    }
}

/// `<prefix>-<NN>-<4 random [a-z0-9]><suffix>`, numbered from 1.
fn shop_name<R: Rng + ?Sized>(opts: &DummyShopOptions, index: usize, rng: &mut R) -> String {
    let tag: String = (0..4)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect();
    format!("{}-{index:02}-{tag}{}", opts.name_prefix, opts.domain_suffix)
}

pub fn generate_dummy_shops<R: Rng + ?Sized>(opts: &DummyShopOptions, rng: &mut R) -> Vec<ShopEntry> {
    (1..=opts.count)
        .map(|i| {
            let name = shop_name(opts, i, rng);
            let revenue = round2(rng.gen_range(opts.min_revenue..=opts.max_revenue));
            ShopEntry::new(name, revenue)
        })
        .collect()
}

/// Write shops in registry format, one per line.
pub fn write_registry<W: Write>(shops: &[ShopEntry], mut out: W) -> std::io::Result<()> {
    for shop in shops {
        writeln!(out, "{},{:.2}", shop.shop_id, shop.base_revenue)?;
    }
    out.flush()
}

pub fn write_registry_file(shops: &[ShopEntry], path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_registry(shops, std::io::BufWriter::new(std::fs::File::create(path)?))
}
