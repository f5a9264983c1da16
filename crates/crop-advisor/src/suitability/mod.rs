//! Rule-based crop suitability scoring and ranking.
//!
//! Each catalog crop is checked against a site observation with seven independent
//! pass/fail rules; the pass count maps to a suitability category and the ranked
//! top of the list becomes the suggestion set.

pub mod catalog;
pub mod domain;
mod ranking;
mod rules;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, CropCatalog};
pub use domain::{
    CropProfile, NutrientLevels, Observation, ObservationDefaults, ObservationInput,
    SuggestedCrop, SuitabilityCategory, SuitabilityResult, ToleranceRange,
};
pub use ranking::{rank, DEFAULT_SUGGESTION_LIMIT};
pub use rules::SuitabilityChecks;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::forecast::{round_currency, HistoricalStore};

#[derive(Debug, thiserror::Error)]
pub enum SuitabilityError {
    #[error("missing required field '{0}'")]
    MissingRequiredField(&'static str),
}

/// Rubric settings applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityConfig {
    pub defaults: ObservationDefaults,
    /// Maximum absolute gap between target and observed nutrient levels.
    pub nutrient_tolerance: NutrientLevels,
    pub suggestion_limit: usize,
}

impl Default for SuitabilityConfig {
    fn default() -> Self {
        Self {
            defaults: ObservationDefaults::default(),
            nutrient_tolerance: NutrientLevels {
                nitrogen: 50.0,
                phosphorus: 40.0,
                potassium: 50.0,
            },
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

/// Stateless scorer over an injected catalog.
#[derive(Debug, Clone)]
pub struct SuitabilityEngine {
    catalog: CropCatalog,
    config: SuitabilityConfig,
}

impl SuitabilityEngine {
    pub fn new(catalog: CropCatalog, config: SuitabilityConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &CropCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SuitabilityConfig {
        &self.config
    }

    pub fn checks(&self, profile: &CropProfile, observation: &Observation) -> SuitabilityChecks {
        rules::check_profile(profile, observation, &self.config.nutrient_tolerance)
    }

    pub fn score(&self, profile: &CropProfile, observation: &Observation) -> SuitabilityResult {
        let score = self.checks(profile, observation).score();
        let category = SuitabilityCategory::from_score(score);

        debug!(crop = %profile.name, score, category = category.label(), "scored crop");

        SuitabilityResult {
            crop_name: profile.name.clone(),
            category,
            score,
            harvest_days: profile.growing_days,
            expected_yield: profile.expected_yield.clone(),
            profit_margin: profile.profit_margin,
        }
    }

    /// Score every catalog crop, in catalog order.
    pub fn evaluate(
        &self,
        input: &ObservationInput,
    ) -> Result<Vec<SuitabilityResult>, SuitabilityError> {
        let observation = self.config.defaults.merge(input)?;

        Ok(self
            .catalog
            .profiles()
            .iter()
            .map(|profile| self.score(profile, &observation))
            .collect())
    }

    pub fn suggest(&self, input: &ObservationInput) -> Result<SuggestionReport, SuitabilityError> {
        let scored = self.evaluate(input)?;
        let ranked = rank(scored, self.config.suggestion_limit);

        Ok(SuggestionReport {
            suggested_crops: ranked.into_iter().map(SuggestedCrop::from).collect(),
        })
    }
}

/// Response document for a suitability request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionReport {
    pub suggested_crops: Vec<SuggestedCrop>,
}

impl SuggestionReport {
    /// Attach the latest market price and a margin-based price projection for
    /// crops the history knows about.
    pub fn with_market_prices(mut self, history: &HistoricalStore) -> Self {
        for crop in &mut self.suggested_crops {
            if let Some(price) = history.latest_price(&crop.name) {
                crop.current_price = Some(round_currency(price));
                crop.predicted_price =
                    Some(round_currency(price * (1.0 + crop.profit_margin / 100.0)));
            }
        }
        self
    }
}
