//! Core library for the `wxnorm` CLI.
//!
//! This crate defines:
//! - Shared domain models (queries, normalized records)
//! - The normalization adapter mapping provider payloads to those models
//! - Abstraction over weather providers (raw JSON fetch)
//! - Configuration & credentials handling
//!
//! It is used by `wxnorm-cli`, but the normalizer is plain functions over
//! `serde_json::Value` and can be reused by any HTTP front end.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;

pub use config::{Config, ProviderConfig};
pub use error::{AdapterError, Result};
pub use model::{
    CitySuggestion, NormalizedCurrent, NormalizedForecastDay, UnitSystem, WeatherQuery,
    WeatherReport,
};
pub use normalize::{normalize_current, normalize_forecast, normalize_suggestions};
pub use provider::{ProviderKind, WeatherProvider};
pub use service::WeatherService;
