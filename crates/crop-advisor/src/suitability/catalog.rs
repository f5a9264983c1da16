use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::domain::CropProfile;

const REFERENCE_CATALOG: &str = include_str!("../../data/reference_catalog.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read crop catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid crop catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("crop catalog is empty")]
    Empty,
    #[error("crop '{0}' appears more than once in the catalog")]
    DuplicateCrop(String),
    #[error("crop '{crop}' has an inverted {field} range (min > max)")]
    InvalidRange { crop: String, field: &'static str },
}

/// Immutable set of crop profiles, kept in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct CropCatalog {
    profiles: Vec<CropProfile>,
}

impl CropCatalog {
    pub fn new(profiles: Vec<CropProfile>) -> Result<Self, CatalogError> {
        validate(&profiles)?;
        Ok(Self { profiles })
    }

    /// The seven-crop catalog bundled with the crate.
    pub fn reference() -> Result<Self, CatalogError> {
        Self::from_reader(REFERENCE_CATALOG.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let profiles: Vec<CropProfile> = serde_json::from_reader(reader)?;
        Self::new(profiles)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn profiles(&self) -> &[CropProfile] {
        &self.profiles
    }

    pub fn get(&self, name: &str) -> Option<&CropProfile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate(profiles: &[CropProfile]) -> Result<(), CatalogError> {
    if profiles.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::new();
    for profile in profiles {
        if !seen.insert(profile.name.as_str()) {
            return Err(CatalogError::DuplicateCrop(profile.name.clone()));
        }
        if let Some((field, _)) = profile
            .ranges()
            .into_iter()
            .find(|(_, range)| !range.is_ordered())
        {
            return Err(CatalogError::InvalidRange {
                crop: profile.name.clone(),
                field,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_catalog_loads_seven_crops_in_order() {
        let catalog = CropCatalog::reference().expect("bundled catalog parses");
        let names: Vec<_> = catalog
            .profiles()
            .iter()
            .map(|profile| profile.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Tomato", "Onion", "Rice", "Potato", "Cotton", "Green Chili", "Brinjal"]
        );
        let rice = catalog.get("Rice").expect("rice present");
        assert!(rice.profit_margin < 0.0);
        assert!(!catalog.get("Cotton").expect("cotton").accepts_soil("Loamy"));
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut profiles = CropCatalog::reference()
            .expect("bundled catalog parses")
            .profiles()
            .to_vec();
        profiles[0].ph.min = 9.0;

        match CropCatalog::new(profiles) {
            Err(CatalogError::InvalidRange { crop, field }) => {
                assert_eq!(crop, "Tomato");
                assert_eq!(field, "ph");
            }
            other => panic!("expected invalid range, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_names() {
        let reference = CropCatalog::reference().expect("bundled catalog parses");
        let mut profiles = reference.profiles().to_vec();
        profiles.push(profiles[1].clone());

        assert!(matches!(
            CropCatalog::new(profiles),
            Err(CatalogError::DuplicateCrop(name)) if name == "Onion"
        ));
    }

    #[test]
    fn rejects_empty_and_malformed_input() {
        assert!(matches!(
            CropCatalog::from_reader("[]".as_bytes()),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            CropCatalog::from_reader("{\"name\": 1}".as_bytes()),
            Err(CatalogError::Json(_))
        ));
    }
}
