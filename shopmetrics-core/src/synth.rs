//! Daily metric synthesizer.
//!
//! gross = base × seasonal(month) × weekend(day) × (1 + N(0, σ)), clamped at 0.
//! Each of the five costs is gross × its own ratio drawn uniformly from the
//! configured range. Ratios are independent and never normalized, so a day can
//! end with negative net revenue.

use crate::config::{GenerationConfig, RatioRange};
use crate::domain::{CostBreakdown, MetricRecord, ShopEntry};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid noise standard deviation {0}")]
    InvalidNoise(f64),

    #[error("invalid {name} cost ratio range [{low}, {high}]")]
    InvalidRatio {
        name: &'static str,
        low: f64,
        high: f64,
    },
}

/// Produces one [`MetricRecord`] per `(shop, date)` from a caller-supplied RNG.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: GenerationConfig,
    noise: Normal<f64>,
}

impl Synthesizer {
    pub fn new(config: &GenerationConfig) -> Result<Self, SynthError> {
        if !(config.noise_std >= 0.0 && config.noise_std.is_finite()) {
            return Err(SynthError::InvalidNoise(config.noise_std));
        }
        let noise = Normal::new(0.0, config.noise_std)
            .map_err(|_| SynthError::InvalidNoise(config.noise_std))?;

        let ratios = &config.cost_ratios;
        for (name, range) in [
            ("product", ratios.product),
            ("marketing", ratios.marketing),
            ("fulfillment", ratios.fulfillment),
            ("processing", ratios.processing),
            ("other", ratios.other),
        ] {
            if !(range.low >= 0.0 && range.low <= range.high && range.high.is_finite()) {
                return Err(SynthError::InvalidRatio {
                    name,
                    low: range.low,
                    high: range.high,
                });
            }
        }

        Ok(Self {
            config: config.clone(),
            noise,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Weekend multiplier: applied on Saturday and Sunday only.
    pub fn weekend_factor(&self, date: NaiveDate) -> f64 {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => self.config.weekend_factor,
            _ => 1.0,
        }
    }

    /// Expected gross before noise.
    pub fn gross_base(&self, base_revenue: f64, date: NaiveDate) -> f64 {
        base_revenue * self.config.seasonal_factor(date.month()) * self.weekend_factor(date)
    }

    /// Synthesize one day for one shop. Consumes six draws from `rng`:
    /// the noise sample, then the product, marketing, fulfillment,
    /// processing and other ratios, in that order.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        shop: &ShopEntry,
        date: NaiveDate,
        rng: &mut R,
    ) -> MetricRecord {
        let sample = self.noise.sample(rng);
        let gross = (self.gross_base(shop.base_revenue, date) * (1.0 + sample)).max(0.0);

        let ratios = &self.config.cost_ratios;
        let costs = CostBreakdown {
            product: gross * draw(rng, ratios.product),
            marketing: gross * draw(rng, ratios.marketing),
            fulfillment: gross * draw(rng, ratios.fulfillment),
            processing: gross * draw(rng, ratios.processing),
            other: gross * draw(rng, ratios.other),
        };

        MetricRecord::from_raw(&shop.shop_id, date, gross, costs)
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: RatioRange) -> f64 {
    rng.gen_range(range.low..=range.high)
}
