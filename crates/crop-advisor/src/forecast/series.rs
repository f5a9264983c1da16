use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One monthly market observation for a crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    pub crop_name: String,
    pub month: u32,
    pub year: i32,
    pub rainfall: f64,
    pub wpi: f64,
    pub price: f64,
}

impl HistoricalSample {
    fn period(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

/// Chronological samples for a single crop; the last sample is the most recent.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSeries {
    pub crop_name: String,
    pub samples: Vec<HistoricalSample>,
}

impl CropSeries {
    pub fn oldest(&self) -> Option<&HistoricalSample> {
        self.samples.first()
    }

    pub fn latest(&self) -> Option<&HistoricalSample> {
        self.samples.last()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryImportError {
    #[error("failed to read price history: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid price history CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("price history row for '{crop}' has month {month}; expected 1-12")]
    InvalidMonth { crop: String, month: u32 },
}

/// Per-crop price history, keeping crops in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalStore {
    series: Vec<CropSeries>,
}

impl HistoricalStore {
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = HistoricalSample>,
    {
        let mut series: Vec<CropSeries> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for sample in samples {
            let slot = *index.entry(sample.crop_name.clone()).or_insert_with(|| {
                series.push(CropSeries {
                    crop_name: sample.crop_name.clone(),
                    samples: Vec::new(),
                });
                series.len() - 1
            });
            series[slot].samples.push(sample);
        }

        for entry in &mut series {
            entry.samples.sort_by_key(HistoricalSample::period);
        }

        Self { series }
    }

    /// Add or replace the series for one crop; an empty series is kept as-is.
    pub fn with_series(mut self, crop_name: &str, mut samples: Vec<HistoricalSample>) -> Self {
        samples.sort_by_key(HistoricalSample::period);
        let replacement = CropSeries {
            crop_name: crop_name.to_string(),
            samples,
        };

        match self
            .series
            .iter_mut()
            .find(|entry| entry.crop_name == crop_name)
        {
            Some(existing) => *existing = replacement,
            None => self.series.push(replacement),
        }
        self
    }

    /// Parse a CSV export with a `crop_name,month,year,rainfall,wpi,price` header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, HistoryImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut samples = Vec::new();

        for record in csv_reader.deserialize::<HistoricalSample>() {
            let sample = record?;
            if !(1..=12).contains(&sample.month) {
                return Err(HistoryImportError::InvalidMonth {
                    crop: sample.crop_name,
                    month: sample.month,
                });
            }
            samples.push(sample);
        }

        Ok(Self::from_samples(samples))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, HistoryImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn series(&self) -> &[CropSeries] {
        &self.series
    }

    pub fn get(&self, crop_name: &str) -> Option<&CropSeries> {
        self.series
            .iter()
            .find(|entry| entry.crop_name == crop_name)
    }

    pub fn latest_price(&self, crop_name: &str) -> Option<f64> {
        self.get(crop_name)
            .and_then(CropSeries::latest)
            .map(|sample| sample.price)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "crop_name,month,year,rainfall,wpi,price\n\
Onion, 2, 2023, 55.0, 125.4, 41.5\n\
Tomato, 12, 2022, 100.0, 122.4, 70.1\n\
Onion, 1, 2023, 10.0, 125.2, 40.0\n\
Tomato, 1, 2023, 10.0, 125.2, 72.3\n";

    #[test]
    fn import_groups_by_crop_and_orders_chronologically() {
        let store = HistoricalStore::from_reader(CSV.as_bytes()).expect("csv imports");

        let names: Vec<_> = store
            .series()
            .iter()
            .map(|entry| entry.crop_name.as_str())
            .collect();
        assert_eq!(names, vec!["Onion", "Tomato"]);

        let onion = store.get("Onion").expect("onion series");
        assert_eq!(onion.samples[0].month, 1);
        assert_eq!(onion.latest().map(|sample| sample.month), Some(2));

        let tomato = store.get("Tomato").expect("tomato series");
        assert_eq!(tomato.latest().map(|sample| sample.year), Some(2023));
        assert_eq!(store.latest_price("Tomato"), Some(72.3));
        assert_eq!(store.latest_price("Cotton"), None);
    }

    #[test]
    fn import_rejects_out_of_range_month() {
        let csv = "crop_name,month,year,rainfall,wpi,price\nRice,13,2023,10,120,30\n";
        match HistoricalStore::from_reader(csv.as_bytes()) {
            Err(HistoryImportError::InvalidMonth { crop, month }) => {
                assert_eq!(crop, "Rice");
                assert_eq!(month, 13);
            }
            other => panic!("expected invalid month, got {other:?}"),
        }
    }

    #[test]
    fn import_rejects_non_numeric_price() {
        let csv = "crop_name,month,year,rainfall,wpi,price\nRice,1,2023,10,120,cheap\n";
        assert!(matches!(
            HistoricalStore::from_reader(csv.as_bytes()),
            Err(HistoryImportError::Csv(_))
        ));
    }

    #[test]
    fn with_series_replaces_existing_entry() {
        let store = HistoricalStore::from_reader(CSV.as_bytes())
            .expect("csv imports")
            .with_series("Onion", Vec::new())
            .with_series("Wheat", Vec::new());

        assert_eq!(store.series().len(), 3);
        assert!(store.get("Onion").expect("onion kept").samples.is_empty());
        assert_eq!(store.series()[2].crop_name, "Wheat");
    }
}
