use serde::Serialize;

use super::classify::{CropCategory, DemandTier, ForecastResult};

pub const DEFAULT_REPORT_LIMIT: usize = 5;

/// Round a monetary or percentage value to two decimal places.
///
/// Values that round to zero come back as positive zero so reports never show `-0.0`.
pub fn round_currency(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Forecasts ordered for display, still holding unrounded values.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub profitable: Vec<ForecastResult>,
    pub demandable: Vec<ForecastResult>,
    pub all: Vec<ForecastResult>,
}

pub fn aggregate(results: Vec<ForecastResult>, limit: usize) -> ForecastReport {
    let mut profitable = results.clone();
    profitable.sort_by(|a, b| b.price_change_percentage.total_cmp(&a.price_change_percentage));
    profitable.truncate(limit);

    let mut demandable = results.clone();
    demandable.sort_by(|a, b| {
        a.demand
            .rank()
            .cmp(&b.demand.rank())
            .then_with(|| b.price_change_percentage.total_cmp(&a.price_change_percentage))
    });
    demandable.truncate(limit);

    ForecastReport {
        profitable,
        demandable,
        all: results,
    }
}

impl ForecastReport {
    pub fn view(&self) -> ForecastReportView {
        let views = |results: &[ForecastResult]| -> Vec<ForecastView> {
            results.iter().map(ForecastView::from).collect()
        };

        ForecastReportView {
            profitable_crops: views(&self.profitable),
            demandable_crops: views(&self.demandable),
            all_crops: views(&self.all),
        }
    }
}

/// Response document for a forecast request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReportView {
    pub profitable_crops: Vec<ForecastView>,
    pub demandable_crops: Vec<ForecastView>,
    pub all_crops: Vec<ForecastView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastView {
    pub crop_name: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change: f64,
    pub price_change_percentage: f64,
    pub category: CropCategory,
    pub demand: DemandTier,
}

impl From<&ForecastResult> for ForecastView {
    fn from(result: &ForecastResult) -> Self {
        Self {
            crop_name: result.crop_name.clone(),
            current_price: round_currency(result.current_price),
            predicted_price: round_currency(result.predicted_price),
            price_change: round_currency(result.price_change),
            price_change_percentage: round_currency(result.price_change_percentage),
            category: result.category,
            demand: result.demand,
        }
    }
}
