use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::forecast::{
    CategoryTable, FeatureRow, ForecastEngine, ForecastResult, HistoricalSample, ModelError,
    PriceForecaster, PriceModel, TrendClassifier,
};

#[derive(Debug, Clone)]
pub(super) enum StubOutcome {
    /// Every future month predicts the same price.
    Flat(f64),
    /// Month `i` of the horizon predicts `step * (i + 1)`.
    Ramp(f64),
    Fail(ModelError),
    /// Drops the final prediction.
    Short(f64),
}

/// Deterministic model that records how often it was asked to predict.
#[derive(Debug)]
pub(super) struct StubModel {
    outcome: StubOutcome,
    calls: AtomicUsize,
}

impl StubModel {
    pub(super) fn new(outcome: StubOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceModel for StubModel {
    fn predict_forward(
        &self,
        _samples: &[HistoricalSample],
        future: &[FeatureRow],
    ) -> Result<Vec<f64>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StubOutcome::Flat(price) => Ok(vec![*price; future.len()]),
            StubOutcome::Ramp(step) => Ok((1..=future.len())
                .map(|index| step * index as f64)
                .collect()),
            StubOutcome::Fail(error) => Err(error.clone()),
            StubOutcome::Short(price) => Ok(vec![*price; future.len().saturating_sub(1)]),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub(super) fn stub_engine(outcome: StubOutcome, horizon_months: u32) -> ForecastEngine<StubModel> {
    let forecaster =
        PriceForecaster::new(StubModel::new(outcome), horizon_months).expect("positive horizon");
    ForecastEngine::new(forecaster, classifier())
}

pub(super) fn classifier() -> TrendClassifier {
    TrendClassifier::new(CategoryTable::reference())
}

pub(super) fn sample(crop_name: &str, year: i32, month: u32, price: f64) -> HistoricalSample {
    HistoricalSample {
        crop_name: crop_name.to_string(),
        month,
        year,
        rainfall: crate::forecast::seasonal_rainfall(month),
        wpi: 100.0 + f64::from(year - 2018) * 5.0 + f64::from(month) * 0.2,
        price,
    }
}

/// Monthly samples from January 2018 whose price rises every month, with a
/// small seasonal ripple on top of the trend.
pub(super) fn rising_series(crop_name: &str, months: usize) -> Vec<HistoricalSample> {
    (0..months)
        .map(|index| {
            let year = 2018 + (index / 12) as i32;
            let month = (index % 12) as u32 + 1;
            let ripple = (f64::from(month) / 12.0 * 2.0 * PI).sin();
            sample(crop_name, year, month, 50.0 + 0.8 * index as f64 + ripple)
        })
        .collect()
}

pub(super) fn short_series(crop_name: &str, prices: &[f64]) -> Vec<HistoricalSample> {
    prices
        .iter()
        .enumerate()
        .map(|(index, price)| sample(crop_name, 2023, index as u32 + 1, *price))
        .collect()
}

pub(super) fn result(crop_name: &str, latest: f64, predicted: f64) -> ForecastResult {
    classifier()
        .classify(crop_name, latest, predicted)
        .expect("positive latest price")
}
