use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AdapterError, Result};

/// Forecast horizon used when the caller does not ask for one.
pub const DEFAULT_FORECAST_DAYS: u8 = 7;

/// Longest forecast any supported provider serves.
pub const MAX_FORECAST_DAYS: u8 = 14;

/// Suggestions returned when no explicit limit is given.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(UnitSystem::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(UnitSystem::Imperial),
            _ => Err(AdapterError::invalid_input(format!(
                "unknown unit system '{s}', expected 'metric' or 'imperial'"
            ))),
        }
    }
}

/// A validated request for weather at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    latitude: f64,
    longitude: f64,
    units: UnitSystem,
    forecast_days: Option<u8>,
}

impl WeatherQuery {
    pub fn new(latitude: f64, longitude: f64, units: UnitSystem) -> Result<Self> {
        if !is_latitude(latitude) {
            return Err(AdapterError::invalid_input(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !is_longitude(longitude) {
            return Err(AdapterError::invalid_input(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }

        Ok(Self { latitude, longitude, units, forecast_days: None })
    }

    pub fn with_forecast_days(mut self, days: u8) -> Result<Self> {
        if !(1..=MAX_FORECAST_DAYS).contains(&days) {
            return Err(AdapterError::invalid_input(format!(
                "forecast days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
            )));
        }
        self.forecast_days = Some(days);
        Ok(self)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn forecast_days(&self) -> Option<u8> {
        self.forecast_days
    }

    /// Requested horizon, falling back to [`DEFAULT_FORECAST_DAYS`].
    pub fn forecast_horizon(&self) -> u8 {
        self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS)
    }

    /// `"lat,lon"` as accepted by location query parameters.
    pub fn coordinates(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

pub(crate) fn is_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

pub(crate) fn is_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCurrent {
    /// Always expressed in `units`.
    pub temperature: f64,
    pub units: UnitSystem,
    /// Untouched provider payload, for presentation layers that need more.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedForecastDay {
    pub date: String,
    pub average_temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySuggestion {
    pub label: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

/// Current conditions plus the daily outlook, in one unit system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub current: NormalizedCurrent,
    pub forecast: Vec<NormalizedForecastDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_accepts_boundary_coordinates() {
        assert!(WeatherQuery::new(90.0, 180.0, UnitSystem::Metric).is_ok());
        assert!(WeatherQuery::new(-90.0, -180.0, UnitSystem::Imperial).is_ok());
    }

    #[test]
    fn query_rejects_out_of_range_latitude() {
        let err = WeatherQuery::new(90.5, 0.0, UnitSystem::Metric).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidInput { .. }));
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn query_rejects_out_of_range_longitude() {
        let err = WeatherQuery::new(0.0, -180.1, UnitSystem::Metric).unwrap_err();
        assert!(err.to_string().contains("longitude"));
    }

    #[test]
    fn query_rejects_nan() {
        assert!(WeatherQuery::new(f64::NAN, 0.0, UnitSystem::Metric).is_err());
        assert!(WeatherQuery::new(0.0, f64::INFINITY, UnitSystem::Metric).is_err());
    }

    #[test]
    fn forecast_days_are_bounded() {
        let q = WeatherQuery::new(1.0, 2.0, UnitSystem::Metric).unwrap();
        assert_eq!(q.forecast_horizon(), DEFAULT_FORECAST_DAYS);
        assert!(q.with_forecast_days(0).is_err());
        assert!(q.with_forecast_days(15).is_err());
        assert_eq!(q.with_forecast_days(3).unwrap().forecast_horizon(), 3);
    }

    #[test]
    fn unit_system_parses_aliases() {
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert_eq!("c".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
        assert!("kelvin".parse::<UnitSystem>().is_err());
    }

    #[test]
    fn suggestion_serializes_with_short_coordinate_keys() {
        let s = CitySuggestion { label: "Paris, France".into(), latitude: 48.86, longitude: 2.35 };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["lat"], 48.86);
        assert_eq!(json["lon"], 2.35);
    }
}
