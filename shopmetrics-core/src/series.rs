//! Series generation: every shop × the `days` consecutive dates ending today.

use crate::domain::{MetricRecord, ShopEntry};
use crate::rng::SeedPolicy;
use crate::synth::Synthesizer;
use chrono::{Duration, NaiveDate};
use tracing::debug;

/// The `days` dates ending at `today`, newest first.
pub fn dates_back_from(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..i64::from(days)).map(|i| today - Duration::days(i)).collect()
}

/// Generate `shops.len() × days` records.
///
/// Order is shop-major, then date descending from `today`, matching
/// iteration order. Each shop draws from its own RNG obtained from `seeds`.
pub fn generate_series(
    shops: &[ShopEntry],
    today: NaiveDate,
    days: u32,
    synth: &Synthesizer,
    seeds: &SeedPolicy,
) -> Vec<MetricRecord> {
    let dates = dates_back_from(today, days);
    let mut records = Vec::with_capacity(shops.len() * dates.len());

    for shop in shops {
        let mut rng = seeds.rng_for(&shop.shop_id);
        for &date in &dates {
            records.push(synth.synthesize(shop, date, &mut rng));
        }
        debug!(shop = %shop.shop_id, days, "synthesized series");
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn shops() -> Vec<ShopEntry> {
        vec![
            ShopEntry::new("a.test", 1000.0),
            ShopEntry::new("b.test", 500.0),
        ]
    }

    #[test]
    fn dates_walk_backward_including_today() {
        let dates = dates_back_from(day(2024, 3, 2), 3);
        assert_eq!(dates, vec![day(2024, 3, 2), day(2024, 3, 1), day(2024, 2, 29)]);
    }

    #[test]
    fn count_and_order() {
        let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
        let records = generate_series(&shops(), day(2024, 1, 15), 4, &synth, &SeedPolicy::Fixed(1));

        assert_eq!(records.len(), 8);
        assert!(records[..4].iter().all(|r| r.shop_id == "a.test"));
        assert!(records[4..].iter().all(|r| r.shop_id == "b.test"));
        assert_eq!(records[0].date, day(2024, 1, 15));
        assert_eq!(records[3].date, day(2024, 1, 12));
        assert_eq!(records[4].date, day(2024, 1, 15));
    }

    #[test]
    fn fixed_seed_is_order_independent() {
        let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
        let seeds = SeedPolicy::Fixed(99);
        let forward = generate_series(&shops(), day(2024, 1, 15), 3, &synth, &seeds);

        let mut reversed_shops = shops();
        reversed_shops.reverse();
        let reversed = generate_series(&reversed_shops, day(2024, 1, 15), 3, &synth, &seeds);

        assert_eq!(&forward[..3], &reversed[3..]);
        assert_eq!(&forward[3..], &reversed[..3]);
    }

    #[test]
    fn empty_registry_yields_nothing() {
        let synth = Synthesizer::new(&GenerationConfig::default()).unwrap();
        assert!(generate_series(&[], day(2024, 1, 15), 10, &synth, &SeedPolicy::Entropy).is_empty());
    }
}
