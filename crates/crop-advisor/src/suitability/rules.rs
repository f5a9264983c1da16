use super::domain::{CropProfile, NutrientLevels, Observation};

/// Outcome of each independent agronomic check for one crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitabilityChecks {
    pub temperature: bool,
    pub ph: bool,
    pub soil: bool,
    pub wind: bool,
    pub nitrogen: bool,
    pub phosphorus: bool,
    pub potassium: bool,
}

impl SuitabilityChecks {
    pub const MAX_SCORE: u8 = 7;

    /// Number of checks that passed, in `0..=7`.
    pub fn score(&self) -> u8 {
        [
            self.temperature,
            self.ph,
            self.soil,
            self.wind,
            self.nitrogen,
            self.phosphorus,
            self.potassium,
        ]
        .into_iter()
        .filter(|passed| *passed)
        .count() as u8
    }
}

pub(crate) fn check_profile(
    profile: &CropProfile,
    observation: &Observation,
    tolerance: &NutrientLevels,
) -> SuitabilityChecks {
    let target = &profile.nutrients;
    let actual = &observation.nutrients;

    SuitabilityChecks {
        temperature: profile.temperature.contains(observation.avg_temp),
        ph: profile.ph.contains(observation.ph_level),
        soil: profile.accepts_soil(&observation.soil_type),
        wind: profile.wind_speed.contains(observation.avg_wind_speed),
        nitrogen: (target.nitrogen - actual.nitrogen).abs() <= tolerance.nitrogen,
        phosphorus: (target.phosphorus - actual.phosphorus).abs() <= tolerance.phosphorus,
        potassium: (target.potassium - actual.potassium).abs() <= tolerance.potassium,
    }
}
