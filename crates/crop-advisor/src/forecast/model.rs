use std::f64::consts::PI;

use super::series::HistoricalSample;

pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
/// Longest forecast window accepted; ten years of monthly rows.
pub const MAX_HORIZON_MONTHS: u32 = 120;

const FUTURE_WPI_PER_YEAR: f64 = 5.0;
const FUTURE_WPI_PER_MONTH: f64 = 0.2;
const MIN_RAINFALL_MM: f64 = 5.0;

/// Feature vector consumed by price models: month, year, rainfall and WPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub month: u32,
    pub year: i32,
    pub rainfall: f64,
    pub wpi: f64,
}

impl FeatureRow {
    pub const WIDTH: usize = 4;

    pub fn from_sample(sample: &HistoricalSample) -> Self {
        Self {
            month: sample.month,
            year: sample.year,
            rainfall: sample.rainfall,
            wpi: sample.wpi,
        }
    }

    pub fn values(&self) -> [f64; Self::WIDTH] {
        [
            f64::from(self.month),
            f64::from(self.year),
            self.rainfall,
            self.wpi,
        ]
    }

    /// Monotone month counter used for trend fitting.
    pub fn period(&self) -> f64 {
        f64::from(self.year) * 12.0 + f64::from(self.month)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("need at least {required} samples to fit, found {found}")]
    InsufficientSamples { found: usize, required: usize },
    #[error("all samples fall in the same period; no trend can be fitted")]
    DegenerateSeries,
    #[error("series contains non-finite values")]
    NonFiniteInput,
    #[error("model returned {found} predictions for a {expected}-month horizon")]
    PredictionCount { expected: usize, found: usize },
    #[error("model returned a non-finite prediction")]
    NonFinitePrediction,
}

/// Strategy that fits a crop's history and predicts prices for future feature rows.
pub trait PriceModel: Send + Sync {
    fn predict_forward(
        &self,
        samples: &[HistoricalSample],
        future: &[FeatureRow],
    ) -> Result<Vec<f64>, ModelError>;

    fn name(&self) -> &str;
}

/// Seasonal monsoon approximation used for months with no observation yet.
pub fn seasonal_rainfall(month: u32) -> f64 {
    let phase = (f64::from(month) - 3.0) / 12.0 * 2.0 * PI;
    (10.0 + 180.0 * phase.sin().powi(2)).max(MIN_RAINFALL_MM)
}

/// Feature rows for the `horizon` months following `latest`.
pub fn future_rows(latest: &HistoricalSample, horizon: u32) -> Vec<FeatureRow> {
    (1..=horizon)
        .map(|step| {
            let offset = latest.month + step - 1;
            let month = offset % 12 + 1;
            let year = latest.year + (offset / 12) as i32;
            let wpi = latest.wpi
                + f64::from(year - latest.year) * FUTURE_WPI_PER_YEAR
                + (f64::from(month) - f64::from(latest.month)) * FUTURE_WPI_PER_MONTH;

            FeatureRow {
                month,
                year,
                rainfall: seasonal_rainfall(month),
                wpi,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn june_2023() -> HistoricalSample {
        HistoricalSample {
            crop_name: "Tomato".to_string(),
            month: 6,
            year: 2023,
            rainfall: 190.0,
            wpi: 126.2,
            price: 80.0,
        }
    }

    #[test]
    fn future_rows_wrap_months_and_advance_year() {
        let rows = future_rows(&june_2023(), 12);
        let periods: Vec<_> = rows.iter().map(|row| (row.year, row.month)).collect();

        assert_eq!(rows.len(), 12);
        assert_eq!(periods[0], (2023, 7));
        assert_eq!(periods[5], (2023, 12));
        assert_eq!(periods[6], (2024, 1));
        assert_eq!(periods[11], (2024, 6));
    }

    #[test]
    fn future_wpi_extrapolates_from_latest_sample() {
        let rows = future_rows(&june_2023(), 12);

        assert_relative_eq!(rows[0].wpi, 126.2 + 0.2, epsilon = 1e-9);
        // January 2024: one year on, five months back in the calendar.
        assert_relative_eq!(rows[6].wpi, 126.2 + 5.0 - 1.0, epsilon = 1e-9);
        assert_relative_eq!(rows[11].wpi, 126.2 + 5.0, epsilon = 1e-9);
    }

    #[test]
    fn december_rolls_into_january() {
        let mut latest = june_2023();
        latest.month = 12;
        let rows = future_rows(&latest, 1);
        assert_eq!((rows[0].year, rows[0].month), (2024, 1));
    }

    #[test]
    fn seasonal_rainfall_peaks_in_monsoon_and_never_drops_below_floor() {
        assert_relative_eq!(seasonal_rainfall(3), 10.0, epsilon = 1e-9);
        assert_relative_eq!(seasonal_rainfall(6), 190.0, epsilon = 1e-9);
        assert!((1..=12).all(|month| seasonal_rainfall(month) >= 5.0));
    }

    #[test]
    fn zero_horizon_yields_no_rows() {
        assert!(future_rows(&june_2023(), 0).is_empty());
    }
}
