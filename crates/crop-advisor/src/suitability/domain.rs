use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::SuitabilityError;

/// Inclusive tolerance band for a single agronomic measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceRange {
    pub min: f64,
    pub max: f64,
}

impl ToleranceRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Target soil nutrient levels (kg/ha).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientLevels {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

/// Reference agronomic profile for one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    pub temperature: ToleranceRange,
    pub rainfall: ToleranceRange,
    pub humidity: ToleranceRange,
    pub wind_speed: ToleranceRange,
    pub ph: ToleranceRange,
    pub soil_types: BTreeSet<String>,
    pub nutrients: NutrientLevels,
    pub growing_days: u32,
    pub expected_yield: String,
    /// Signed percentage; loss-making crops carry a negative margin.
    pub profit_margin: f64,
}

impl CropProfile {
    pub(crate) fn ranges(&self) -> [(&'static str, ToleranceRange); 5] {
        [
            ("temperature", self.temperature),
            ("rainfall", self.rainfall),
            ("humidity", self.humidity),
            ("wind_speed", self.wind_speed),
            ("ph", self.ph),
        ]
    }

    pub fn accepts_soil(&self, soil_type: &str) -> bool {
        self.soil_types.contains(soil_type)
    }
}

/// Site conditions as submitted by a caller; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationInput {
    pub avg_temp: Option<f64>,
    pub ph_level: Option<f64>,
    pub soil_type: Option<String>,
    pub avg_wind_speed: Option<f64>,
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
}

/// Fully resolved site conditions used by the scoring rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub avg_temp: f64,
    pub ph_level: f64,
    pub soil_type: String,
    pub avg_wind_speed: f64,
    pub nutrients: NutrientLevels,
}

/// Values substituted for optional observation fields the caller left out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationDefaults {
    pub avg_temp: f64,
    pub avg_wind_speed: f64,
    pub nutrients: NutrientLevels,
}

impl Default for ObservationDefaults {
    fn default() -> Self {
        Self {
            avg_temp: 28.0,
            avg_wind_speed: 5.0,
            nutrients: NutrientLevels {
                nitrogen: 100.0,
                phosphorus: 70.0,
                potassium: 90.0,
            },
        }
    }
}

impl ObservationDefaults {
    /// Merge a partial input over the defaults. `phLevel` and `soilType` have no default.
    pub fn merge(&self, input: &ObservationInput) -> Result<Observation, SuitabilityError> {
        let ph_level = input
            .ph_level
            .ok_or(SuitabilityError::MissingRequiredField("phLevel"))?;
        let soil_type = input
            .soil_type
            .clone()
            .ok_or(SuitabilityError::MissingRequiredField("soilType"))?;

        Ok(Observation {
            avg_temp: input.avg_temp.unwrap_or(self.avg_temp),
            ph_level,
            soil_type,
            avg_wind_speed: input.avg_wind_speed.unwrap_or(self.avg_wind_speed),
            nutrients: NutrientLevels {
                nitrogen: input.nitrogen.unwrap_or(self.nutrients.nitrogen),
                phosphorus: input.phosphorus.unwrap_or(self.nutrients.phosphorus),
                potassium: input.potassium.unwrap_or(self.nutrients.potassium),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuitabilityCategory {
    #[serde(rename = "Highly Suitable")]
    HighlySuitable,
    #[serde(rename = "Moderately Suitable")]
    ModeratelySuitable,
    #[serde(rename = "Marginally Suitable")]
    MarginallySuitable,
}

impl SuitabilityCategory {
    /// Every score maps to a category; nothing is ever filtered out.
    pub const fn from_score(score: u8) -> Self {
        match score {
            6..=u8::MAX => Self::HighlySuitable,
            4 | 5 => Self::ModeratelySuitable,
            _ => Self::MarginallySuitable,
        }
    }

    /// Ordering key used when ranking suggestions; lower is better.
    pub const fn rank(self) -> u8 {
        match self {
            Self::HighlySuitable => 0,
            Self::ModeratelySuitable => 1,
            Self::MarginallySuitable => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighlySuitable => "Highly Suitable",
            Self::ModeratelySuitable => "Moderately Suitable",
            Self::MarginallySuitable => "Marginally Suitable",
        }
    }
}

/// Outcome of scoring one crop against one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityResult {
    pub crop_name: String,
    pub category: SuitabilityCategory,
    pub score: u8,
    pub harvest_days: u32,
    pub expected_yield: String,
    pub profit_margin: f64,
}

/// Wire shape of a single suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCrop {
    pub name: String,
    pub suitability: SuitabilityCategory,
    pub harvest_days: u32,
    pub expected_yield: String,
    pub profit_margin: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_price: Option<f64>,
}

impl From<SuitabilityResult> for SuggestedCrop {
    fn from(result: SuitabilityResult) -> Self {
        Self {
            name: result.crop_name,
            suitability: result.category,
            harvest_days: result.harvest_days,
            expected_yield: result.expected_yield,
            profit_margin: result.profit_margin,
            current_price: None,
            predicted_price: None,
        }
    }
}
