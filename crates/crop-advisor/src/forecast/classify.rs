use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ForecastError;

pub const HIGH_DEMAND_THRESHOLD: f64 = 15.0;
pub const MEDIUM_DEMAND_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropCategory {
    Vegetable,
    Fruit,
    Grain,
    #[serde(rename = "Cash Crop")]
    CashCrop,
    Other,
}

impl CropCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vegetable => "Vegetable",
            Self::Fruit => "Fruit",
            Self::Grain => "Grain",
            Self::CashCrop => "Cash Crop",
            Self::Other => "Other",
        }
    }
}

/// Crop name to market category lookup; unknown names fall back to `Other`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTable {
    entries: HashMap<String, CropCategory>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference() -> Self {
        Self::new()
            .with(
                CropCategory::Vegetable,
                &["Tomato", "Onion", "Potato", "Green Chili", "Brinjal", "Carrot"],
            )
            .with(CropCategory::Fruit, &["Apple", "Banana", "Orange", "Mango"])
            .with(CropCategory::Grain, &["Rice", "Wheat", "Millet"])
            .with(CropCategory::CashCrop, &["Cotton", "Sugarcane", "Coffee"])
    }

    pub fn with(mut self, category: CropCategory, crops: &[&str]) -> Self {
        for crop in crops {
            self.entries.insert((*crop).to_string(), category);
        }
        self
    }

    pub fn category_of(&self, crop_name: &str) -> CropCategory {
        self.entries
            .get(crop_name)
            .copied()
            .unwrap_or(CropCategory::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandTier {
    #[serde(rename = "High Demand")]
    High,
    #[serde(rename = "Medium Demand")]
    Medium,
    #[serde(rename = "Low Demand")]
    Low,
}

impl DemandTier {
    /// Both thresholds are exclusive: exactly 15% is Medium, exactly 5% is Low.
    pub fn from_change_percentage(percentage: f64) -> Self {
        if percentage > HIGH_DEMAND_THRESHOLD {
            Self::High
        } else if percentage > MEDIUM_DEMAND_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High Demand",
            Self::Medium => "Medium Demand",
            Self::Low => "Low Demand",
        }
    }
}

/// Classified forecast for one crop. Values are unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub crop_name: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change: f64,
    pub price_change_percentage: f64,
    pub category: CropCategory,
    pub demand: DemandTier,
}

#[derive(Debug, Clone, Default)]
pub struct TrendClassifier {
    categories: CategoryTable,
}

impl TrendClassifier {
    pub fn new(categories: CategoryTable) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn classify(
        &self,
        crop_name: &str,
        latest_price: f64,
        predicted_price: f64,
    ) -> Result<ForecastResult, ForecastError> {
        if latest_price.is_nan() || latest_price <= 0.0 {
            return Err(ForecastError::InvalidSeries {
                crop: crop_name.to_string(),
                reason: format!("latest price must be positive, found {latest_price}"),
            });
        }

        let price_change = predicted_price - latest_price;
        let price_change_percentage = price_change / latest_price * 100.0;

        Ok(ForecastResult {
            crop_name: crop_name.to_string(),
            current_price: latest_price,
            predicted_price,
            price_change,
            price_change_percentage,
            category: self.categories.category_of(crop_name),
            demand: DemandTier::from_change_percentage(price_change_percentage),
        })
    }

    /// Classify the observed move from the oldest to the newest price and carry it
    /// one more period forward: `predicted = newest * (1 + change% / 100)`.
    pub fn classify_history(
        &self,
        crop_name: &str,
        oldest_price: f64,
        newest_price: f64,
    ) -> Result<ForecastResult, ForecastError> {
        if oldest_price.is_nan() || oldest_price <= 0.0 {
            return Err(ForecastError::InvalidSeries {
                crop: crop_name.to_string(),
                reason: format!("oldest price must be positive, found {oldest_price}"),
            });
        }

        let price_change = newest_price - oldest_price;
        let price_change_percentage = price_change / oldest_price * 100.0;

        Ok(ForecastResult {
            crop_name: crop_name.to_string(),
            current_price: newest_price,
            predicted_price: newest_price * (1.0 + price_change_percentage / 100.0),
            price_change,
            price_change_percentage,
            category: self.categories.category_of(crop_name),
            demand: DemandTier::from_change_percentage(price_change_percentage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn demand_thresholds_are_exclusive_on_the_high_side() {
        assert_eq!(DemandTier::from_change_percentage(15.01), DemandTier::High);
        assert_eq!(DemandTier::from_change_percentage(15.0), DemandTier::Medium);
        assert_eq!(DemandTier::from_change_percentage(5.01), DemandTier::Medium);
        assert_eq!(DemandTier::from_change_percentage(5.0), DemandTier::Low);
        assert_eq!(DemandTier::from_change_percentage(-30.0), DemandTier::Low);
    }

    #[test]
    fn reference_categories_with_other_fallback() {
        let table = CategoryTable::reference();
        assert_eq!(table.category_of("Brinjal"), CropCategory::Vegetable);
        assert_eq!(table.category_of("Rice"), CropCategory::Grain);
        assert_eq!(table.category_of("Cotton"), CropCategory::CashCrop);
        assert_eq!(table.category_of("Mango"), CropCategory::Fruit);
        assert_eq!(table.category_of("Saffron"), CropCategory::Other);
        assert_eq!(table.category_of("tomato"), CropCategory::Other);
    }

    #[test]
    fn classify_computes_change_and_tier() {
        let classifier = TrendClassifier::new(CategoryTable::reference());
        let result = classifier
            .classify("Onion", 40.0, 47.0)
            .expect("positive latest price");

        assert_relative_eq!(result.price_change, 7.0, epsilon = 1e-9);
        assert_relative_eq!(result.price_change_percentage, 17.5, epsilon = 1e-9);
        assert_eq!(result.demand, DemandTier::High);
        assert_eq!(result.category, CropCategory::Vegetable);
    }

    #[test]
    fn classify_rejects_non_positive_latest_price() {
        let classifier = TrendClassifier::default();
        for latest in [0.0, -3.0, f64::NAN] {
            match classifier.classify("Rice", latest, 10.0) {
                Err(ForecastError::InvalidSeries { crop, .. }) => assert_eq!(crop, "Rice"),
                other => panic!("expected invalid series, got {other:?}"),
            }
        }
    }

    #[test]
    fn history_change_is_relative_to_the_oldest_price() {
        let classifier = TrendClassifier::new(CategoryTable::reference());
        let result = classifier
            .classify_history("Rice", 40.0, 50.0)
            .expect("positive oldest price");

        assert_relative_eq!(result.current_price, 50.0);
        assert_relative_eq!(result.price_change, 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.price_change_percentage, 25.0, epsilon = 1e-9);
        assert_relative_eq!(result.predicted_price, 62.5, epsilon = 1e-9);
        assert_eq!(result.demand, DemandTier::High);
        assert_eq!(result.category, CropCategory::Grain);
    }

    #[test]
    fn history_rejects_non_positive_oldest_price() {
        let classifier = TrendClassifier::default();
        for oldest in [0.0, -1.0, f64::NAN] {
            match classifier.classify_history("Potato", oldest, 20.0) {
                Err(ForecastError::InvalidSeries { crop, reason }) => {
                    assert_eq!(crop, "Potato");
                    assert!(reason.contains("oldest price"));
                }
                other => panic!("expected invalid series, got {other:?}"),
            }
        }
    }

    #[test]
    fn labels_serialize_as_display_strings() {
        let json = serde_json::to_string(&(CropCategory::CashCrop, DemandTier::Medium))
            .expect("serializes");
        assert_eq!(json, r#"["Cash Crop","Medium Demand"]"#);
    }
}
