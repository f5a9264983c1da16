//! Seeded demo price history, used when no CSV export is configured.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::seasonal_rainfall;
use super::series::{HistoricalSample, HistoricalStore};

const FIRST_YEAR: i32 = 2018;
const LAST_YEAR: i32 = 2023;
/// The final year only has data up to June.
const LAST_MONTH_OF_LAST_YEAR: u32 = 6;

/// Name, base price and quote multiplier. Cotton is quoted per quintal.
const TRENDING_CROPS: [(&str, f64, f64); 6] = [
    ("Onion", 40.0, 1.0),
    ("Rice", 35.0, 1.0),
    ("Potato", 20.0, 1.0),
    ("Cotton", 5000.0, 100.0),
    ("Green Chili", 70.0, 1.0),
    ("Brinjal", 30.0, 1.0),
];

fn periods() -> impl Iterator<Item = (i32, u32)> {
    (FIRST_YEAR..=LAST_YEAR).flat_map(|year| {
        let last_month = if year == LAST_YEAR {
            LAST_MONTH_OF_LAST_YEAR
        } else {
            12
        };
        (1..=last_month).map(move |month| (year, month))
    })
}

fn index_wpi(year: i32, month: u32) -> f64 {
    100.0 + f64::from(year - FIRST_YEAR) * 5.0 + f64::from(month) * 0.2
}

fn sample(crop_name: &str, year: i32, month: u32, price: f64) -> HistoricalSample {
    HistoricalSample {
        crop_name: crop_name.to_string(),
        month,
        year,
        rainfall: seasonal_rainfall(month),
        wpi: index_wpi(year, month),
        price,
    }
}

/// Monthly prices for the seven reference crops, January 2018 to June 2023.
pub fn reference_history(seed: u64) -> HistoricalStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::new();

    for (year, month) in periods() {
        let base = 50.0 + f64::from(year - FIRST_YEAR) * 5.0;
        let seasonal = 1.0 + 0.1 * (f64::from(month) / 12.0 * 2.0 * PI).sin();
        let noise = 0.9 + 0.2 * rng.gen::<f64>();
        samples.push(sample("Tomato", year, month, base * seasonal * noise));
    }

    for (crop_index, (crop_name, base_price, quote)) in TRENDING_CROPS.iter().enumerate() {
        for (year, month) in periods() {
            let growth = 1.0 + f64::from(year - FIRST_YEAR) * (0.02 + 0.02 * rng.gen::<f64>());
            let phase = (f64::from(month) + crop_index as f64) / 12.0 * 2.0 * PI;
            let seasonal = 1.0 + 0.15 * phase.sin();
            let noise = 0.95 + 0.1 * rng.gen::<f64>();
            samples.push(sample(
                crop_name,
                year,
                month,
                base_price * growth * seasonal * noise * quote,
            ));
        }
    }

    HistoricalStore::from_samples(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_seven_crops_through_june_2023() {
        let store = reference_history(42);

        assert_eq!(store.series().len(), 7);
        for series in store.series() {
            assert_eq!(series.samples.len(), 66, "{} sample count", series.crop_name);
            let latest = series.latest().expect("non-empty");
            assert_eq!((latest.year, latest.month), (2023, 6));
            assert!(series.samples.iter().all(|sample| sample.price > 0.0));
        }
        assert_eq!(store.series()[0].crop_name, "Tomato");
    }

    #[test]
    fn cotton_is_quoted_per_quintal() {
        let store = reference_history(42);
        let prices = |crop: &str| {
            store
                .get(crop)
                .expect("reference crop")
                .samples
                .iter()
                .map(|sample| sample.price)
                .collect::<Vec<_>>()
        };

        // 5000 base with at most -15% season and -5% noise, times 100.
        assert!(prices("Cotton").iter().all(|price| *price > 400_000.0));
        assert!(prices("Onion").iter().all(|price| *price < 100.0));
    }

    #[test]
    fn seed_pins_the_generated_prices() {
        assert_eq!(reference_history(9), reference_history(9));
        assert_ne!(reference_history(9), reference_history(10));
    }
}
