//! Model-free forecast that extends each crop's observed price move.

use tracing::{debug, info};

use super::aggregate::{aggregate, ForecastReport, DEFAULT_REPORT_LIMIT};
use super::classify::{ForecastResult, TrendClassifier};
use super::series::HistoricalStore;
use super::ForecastError;

/// Projects every series from its oldest and newest samples.
#[derive(Debug, Clone)]
pub struct HistoryExtrapolator {
    classifier: TrendClassifier,
    limit: usize,
}

impl HistoryExtrapolator {
    pub fn new(classifier: TrendClassifier) -> Self {
        Self {
            classifier,
            limit: DEFAULT_REPORT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Results in store order. The first failing crop aborts the batch.
    pub fn results(&self, store: &HistoricalStore) -> Result<Vec<ForecastResult>, ForecastError> {
        store
            .series()
            .iter()
            .map(|series| {
                let (oldest, newest) = match (series.oldest(), series.latest()) {
                    (Some(oldest), Some(newest)) => (oldest, newest),
                    _ => {
                        return Err(ForecastError::InvalidSeries {
                            crop: series.crop_name.clone(),
                            reason: "no historical samples".to_string(),
                        })
                    }
                };

                let result =
                    self.classifier
                        .classify_history(&series.crop_name, oldest.price, newest.price)?;

                debug!(
                    crop = %result.crop_name,
                    oldest = oldest.price,
                    newest = newest.price,
                    change_pct = result.price_change_percentage,
                    "extrapolated crop"
                );
                Ok(result)
            })
            .collect()
    }

    pub fn run(&self, store: &HistoricalStore) -> Result<ForecastReport, ForecastError> {
        let results = self.results(store)?;

        info!(crops = results.len(), "history extrapolation complete");
        Ok(aggregate(results, self.limit))
    }
}
