use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AdapterError, Result},
    model::{NormalizedForecastDay, UnitSystem},
};

use super::decode_at;

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: Option<f64>,
    temp_f: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: Option<f64>,
    avgtemp_f: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
}

impl WaDay {
    fn average(&self, units: UnitSystem) -> Option<f64> {
        match units {
            UnitSystem::Metric => self.avgtemp_c,
            UnitSystem::Imperial => self.avgtemp_f,
        }
    }
}

/// `current.temp_c` or `current.temp_f`, whichever matches `units`.
pub(super) fn current_temperature(payload: &Value, units: UnitSystem) -> Result<f64> {
    let current: WaCurrent = decode_at(payload, "/current")?;
    let (temp, key) = match units {
        UnitSystem::Metric => (current.temp_c, "temp_c"),
        UnitSystem::Imperial => (current.temp_f, "temp_f"),
    };

    temp.ok_or_else(|| AdapterError::missing_field(format!("current.{key}")))
}

pub(super) fn forecast_days(payload: &Value, units: UnitSystem) -> Result<Vec<NormalizedForecastDay>> {
    let Some(days) = payload.pointer("/forecast/forecastday") else {
        return Ok(Vec::new());
    };
    let days = days
        .as_array()
        .ok_or_else(|| AdapterError::missing_field("forecast.forecastday"))?;

    let normalized = days
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let day = match WaForecastDay::deserialize(raw) {
                Ok(day) => day,
                Err(err) => {
                    tracing::warn!(index = idx, error = %err, "skipping malformed WeatherAPI forecast day");
                    return None;
                }
            };
            let Some(average_temperature) = day.day.average(units) else {
                tracing::warn!(index = idx, date = %day.date, %units, "WeatherAPI forecast day lacks average");
                return None;
            };
            Some(NormalizedForecastDay { date: day.date, average_temperature })
        })
        .collect();

    Ok(normalized)
}
