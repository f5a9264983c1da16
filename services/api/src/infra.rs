use crop_advisor::config::AdvisorConfig;
use crop_advisor::error::AppError;
use crop_advisor::forecast::synthetic::reference_history;
use crop_advisor::forecast::{
    CategoryTable, ForecastEngine, ForecastReportView, ForecastRequest, HistoricalStore,
    HistoryExtrapolator, TrendClassifier,
};
use crop_advisor::suitability::{
    CropCatalog, ObservationInput, SuggestionReport, SuitabilityConfig, SuitabilityEngine,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read-only advisory data shared by every request.
#[derive(Clone)]
pub(crate) struct AdvisorState {
    suitability: Arc<SuitabilityEngine>,
    classifier: Arc<TrendClassifier>,
    history: Arc<HistoricalStore>,
    forecast_horizon: u32,
    forecast_seed: u64,
}

impl AdvisorState {
    pub(crate) fn from_config(config: &AdvisorConfig) -> Result<Self, AppError> {
        let catalog = load_catalog(config)?;
        let history = load_history(config)?;
        let suitability = SuitabilityConfig {
            suggestion_limit: config.suggestion_limit,
            ..SuitabilityConfig::default()
        };

        info!(
            crops = catalog.len(),
            price_series = history.series().len(),
            "advisory data loaded"
        );

        Ok(Self::new(
            SuitabilityEngine::new(catalog, suitability),
            TrendClassifier::new(CategoryTable::reference()),
            history,
            config.forecast_horizon,
            config.forecast_seed,
        ))
    }

    pub(crate) fn new(
        suitability: SuitabilityEngine,
        classifier: TrendClassifier,
        history: HistoricalStore,
        forecast_horizon: u32,
        forecast_seed: u64,
    ) -> Self {
        Self {
            suitability: Arc::new(suitability),
            classifier: Arc::new(classifier),
            history: Arc::new(history),
            forecast_horizon,
            forecast_seed,
        }
    }

    /// Ranked suggestions, priced from the shared history where it knows the crop.
    pub(crate) fn suggest(&self, input: &ObservationInput) -> Result<SuggestionReport, AppError> {
        let report = self.suitability.suggest(input)?;
        Ok(report.with_market_prices(&self.history))
    }

    /// CPU-bound; async callers should run this on the blocking pool.
    pub(crate) fn forecast(&self, request: ForecastRequest) -> Result<ForecastReportView, AppError> {
        let engine = ForecastEngine::seeded(
            request.seed.unwrap_or(self.forecast_seed),
            request.horizon_months.unwrap_or(self.forecast_horizon),
            self.classifier.as_ref().clone(),
        )?;
        let report = engine.run(&self.history)?;
        Ok(report.view())
    }

    /// Extends each crop's oldest-to-newest price move without fitting a model.
    pub(crate) fn extrapolate(&self) -> Result<ForecastReportView, AppError> {
        let extrapolator = HistoryExtrapolator::new(self.classifier.as_ref().clone());
        let report = extrapolator.run(&self.history)?;
        Ok(report.view())
    }
}

pub(crate) fn load_catalog(config: &AdvisorConfig) -> Result<CropCatalog, AppError> {
    let catalog = match &config.catalog_path {
        Some(path) => {
            info!(path = %path.display(), "loading crop catalog");
            CropCatalog::from_path(path)?
        }
        None => CropCatalog::reference()?,
    };
    Ok(catalog)
}

/// CSV history when configured, otherwise the seeded demo dataset.
pub(crate) fn load_history(config: &AdvisorConfig) -> Result<HistoricalStore, AppError> {
    let history = match &config.history_csv {
        Some(path) => {
            info!(path = %path.display(), "loading price history");
            HistoricalStore::from_path(path)?
        }
        None => reference_history(config.forecast_seed),
    };
    Ok(history)
}
