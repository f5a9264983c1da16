//! Per-crop price forecasting, demand classification and report aggregation.

pub mod aggregate;
pub mod classify;
pub mod extrapolate;
pub mod forest;
pub mod model;
pub mod series;
pub mod synthetic;

#[cfg(test)]
mod tests;

pub use aggregate::{
    aggregate, round_currency, ForecastReport, ForecastReportView, ForecastView,
    DEFAULT_REPORT_LIMIT,
};
pub use classify::{CategoryTable, CropCategory, DemandTier, ForecastResult, TrendClassifier};
pub use extrapolate::HistoryExtrapolator;
pub use forest::{FittedTrendForest, ForestSettings, TrendForest, DEFAULT_FOREST_SEED};
pub use model::{
    future_rows, seasonal_rainfall, FeatureRow, ModelError, PriceModel, DEFAULT_HORIZON_MONTHS,
    MAX_HORIZON_MONTHS,
};
pub use series::{CropSeries, HistoricalSample, HistoricalStore, HistoryImportError};

use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("invalid series for '{crop}': {reason}")]
    InvalidSeries { crop: String, reason: String },
    #[error("model fit failed for '{crop}': {source}")]
    ModelFitFailure {
        crop: String,
        #[source]
        source: ModelError,
    },
    #[error("forecast horizon must be between 1 and {max} months", max = MAX_HORIZON_MONTHS)]
    InvalidHorizon,
}

/// Optional overrides accepted by forecast requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub horizon_months: Option<u32>,
    pub seed: Option<u64>,
}

/// Latest observation and the mean predicted price over the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesForecast {
    pub latest: HistoricalSample,
    pub predicted_price: f64,
}

#[derive(Debug, Clone)]
pub struct PriceForecaster<M = TrendForest> {
    model: M,
    horizon_months: u32,
}

impl<M: PriceModel> PriceForecaster<M> {
    pub fn new(model: M, horizon_months: u32) -> Result<Self, ForecastError> {
        if !(1..=MAX_HORIZON_MONTHS).contains(&horizon_months) {
            return Err(ForecastError::InvalidHorizon);
        }
        Ok(Self {
            model,
            horizon_months,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn horizon_months(&self) -> u32 {
        self.horizon_months
    }

    pub fn forecast(&self, series: &CropSeries) -> Result<SeriesForecast, ForecastError> {
        let invalid = |reason: String| ForecastError::InvalidSeries {
            crop: series.crop_name.clone(),
            reason,
        };

        let latest = series
            .latest()
            .ok_or_else(|| invalid("no historical samples".to_string()))?;
        if latest.price.is_nan() || latest.price <= 0.0 {
            return Err(invalid(format!(
                "latest price must be positive, found {}",
                latest.price
            )));
        }

        let fit_failure = |source: ModelError| ForecastError::ModelFitFailure {
            crop: series.crop_name.clone(),
            source,
        };

        let future = future_rows(latest, self.horizon_months);
        let predictions = self
            .model
            .predict_forward(&series.samples, &future)
            .map_err(fit_failure)?;

        if predictions.len() != future.len() {
            return Err(fit_failure(ModelError::PredictionCount {
                expected: future.len(),
                found: predictions.len(),
            }));
        }
        if predictions.iter().any(|price| !price.is_finite()) {
            return Err(fit_failure(ModelError::NonFinitePrediction));
        }

        let predicted_price = predictions.iter().sum::<f64>() / predictions.len() as f64;

        Ok(SeriesForecast {
            latest: latest.clone(),
            predicted_price,
        })
    }
}

/// Forecasts every series in a store and aggregates the classified results.
#[derive(Debug, Clone)]
pub struct ForecastEngine<M = TrendForest> {
    forecaster: PriceForecaster<M>,
    classifier: TrendClassifier,
    limit: usize,
}

impl ForecastEngine<TrendForest> {
    /// Engine backed by the default forest settings with the given seed.
    pub fn seeded(
        seed: u64,
        horizon_months: u32,
        classifier: TrendClassifier,
    ) -> Result<Self, ForecastError> {
        let model = TrendForest::new(ForestSettings::default().with_seed(seed));
        Ok(Self::new(
            PriceForecaster::new(model, horizon_months)?,
            classifier,
        ))
    }
}

impl<M: PriceModel> ForecastEngine<M> {
    pub fn new(forecaster: PriceForecaster<M>, classifier: TrendClassifier) -> Self {
        Self {
            forecaster,
            classifier,
            limit: DEFAULT_REPORT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn forecaster(&self) -> &PriceForecaster<M> {
        &self.forecaster
    }

    /// Classified forecasts in store order. The first failing crop aborts the batch.
    pub fn results(&self, store: &HistoricalStore) -> Result<Vec<ForecastResult>, ForecastError> {
        store
            .series()
            .iter()
            .map(|series| {
                let forecast = self.forecaster.forecast(series)?;
                let result = self.classifier.classify(
                    &series.crop_name,
                    forecast.latest.price,
                    forecast.predicted_price,
                )?;

                debug!(
                    crop = %result.crop_name,
                    model = self.forecaster.model().name(),
                    current = result.current_price,
                    predicted = result.predicted_price,
                    demand = result.demand.label(),
                    "forecast crop"
                );
                Ok(result)
            })
            .collect()
    }

    pub fn run(&self, store: &HistoricalStore) -> Result<ForecastReport, ForecastError> {
        let results = self.results(store)?;

        info!(
            crops = results.len(),
            horizon_months = self.forecaster.horizon_months(),
            "forecast batch complete"
        );
        Ok(aggregate(results, self.limit))
    }
}
