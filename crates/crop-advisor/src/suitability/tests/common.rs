use std::collections::BTreeSet;

use crate::suitability::{
    CropCatalog, CropProfile, NutrientLevels, ObservationInput, SuitabilityConfig,
    SuitabilityEngine, ToleranceRange,
};

pub(super) fn reference_engine() -> SuitabilityEngine {
    let catalog = CropCatalog::reference().expect("reference catalog");
    SuitabilityEngine::new(catalog, SuitabilityConfig::default())
}

pub(super) fn engine_with(profiles: Vec<CropProfile>, suggestion_limit: usize) -> SuitabilityEngine {
    let catalog = CropCatalog::new(profiles).expect("valid catalog");
    let config = SuitabilityConfig {
        suggestion_limit,
        ..SuitabilityConfig::default()
    };
    SuitabilityEngine::new(catalog, config)
}

/// Loamy site at 22°C, everything else left to the defaults.
pub(super) fn loamy_site() -> ObservationInput {
    ObservationInput {
        avg_temp: Some(22.0),
        ph_level: Some(6.2),
        soil_type: Some("Loamy".to_string()),
        ..ObservationInput::default()
    }
}

/// Conditions no reference crop tolerates.
pub(super) fn hostile_site() -> ObservationInput {
    ObservationInput {
        avg_temp: Some(45.0),
        ph_level: Some(9.5),
        soil_type: Some("Peaty".to_string()),
        avg_wind_speed: Some(30.0),
        nitrogen: Some(400.0),
        phosphorus: Some(300.0),
        potassium: Some(400.0),
    }
}

/// Profile that passes every rule for `loamy_site` when `soil` is "Loamy".
pub(super) fn profile(name: &str, soil: &str, profit_margin: f64) -> CropProfile {
    CropProfile {
        name: name.to_string(),
        temperature: ToleranceRange::new(15.0, 30.0),
        rainfall: ToleranceRange::new(500.0, 1000.0),
        humidity: ToleranceRange::new(50.0, 80.0),
        wind_speed: ToleranceRange::new(2.0, 10.0),
        ph: ToleranceRange::new(5.5, 7.5),
        soil_types: BTreeSet::from([soil.to_string()]),
        nutrients: NutrientLevels {
            nitrogen: 100.0,
            phosphorus: 70.0,
            potassium: 90.0,
        },
        growing_days: 100,
        expected_yield: "10-12 ton/hectare".to_string(),
        profit_margin,
    }
}
