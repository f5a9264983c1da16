//! Crop suitability scoring and market price forecasting for farm planning.

pub mod config;
pub mod error;
pub mod forecast;
pub mod suitability;
pub mod telemetry;
