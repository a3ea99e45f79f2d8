//! Normalization adapter.
//!
//! Turns already-fetched provider JSON into the canonical records in
//! [`crate::model`]. Everything here is a pure function of its inputs: no
//! I/O, no shared state. The provider schema is selected by [`ProviderKind`].

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AdapterError, Result},
    model::{
        CitySuggestion, NormalizedCurrent, NormalizedForecastDay, UnitSystem, is_latitude,
        is_longitude,
    },
    provider::ProviderKind,
};

mod openweather;
mod weatherapi;

/// Pick the temperature matching `units` out of a current-conditions payload.
pub fn normalize_current(
    kind: ProviderKind,
    payload: &Value,
    units: UnitSystem,
) -> Result<NormalizedCurrent> {
    let temperature = match kind {
        ProviderKind::WeatherApi => weatherapi::current_temperature(payload, units)?,
        ProviderKind::OpenWeather => openweather::current_temperature(payload)?,
    };

    Ok(NormalizedCurrent { temperature, units, raw: payload.clone() })
}

/// One record per forecast day, in provider order. An absent day collection
/// yields an empty list.
pub fn normalize_forecast(
    kind: ProviderKind,
    payload: &Value,
    units: UnitSystem,
) -> Result<Vec<NormalizedForecastDay>> {
    let days = match kind {
        ProviderKind::WeatherApi => weatherapi::forecast_days(payload, units)?,
        ProviderKind::OpenWeather => openweather::forecast_days(payload)?,
    };

    tracing::debug!(provider = %kind, days = days.len(), "normalized forecast");
    Ok(days)
}

/// Builds at most `limit` suggestions from raw geocoding matches.
///
/// Provider order is kept. Entries without a usable name or coordinates are
/// dropped first and do not count against `limit`.
pub fn normalize_suggestions(
    kind: ProviderKind,
    payload: &Value,
    limit: usize,
) -> Result<Vec<CitySuggestion>> {
    let entries = payload.as_array().ok_or_else(|| AdapterError::missing_field("[]"))?;

    let suggestions: Vec<CitySuggestion> = entries
        .iter()
        .filter_map(|entry| {
            let suggestion = place_suggestion(entry);
            if suggestion.is_none() {
                tracing::warn!(provider = %kind, %entry, "skipping place without name or coordinates");
            }
            suggestion
        })
        .take(limit)
        .collect();

    tracing::debug!(
        provider = %kind,
        received = entries.len(),
        kept = suggestions.len(),
        "normalized suggestions"
    );
    Ok(suggestions)
}

/// Only `name`, `lat` and `lon` decide whether an entry is usable; the
/// administrative area (`region` for WeatherAPI, `state` for OpenWeather) and
/// `country` are read leniently and left out of the label when unusable.
fn place_suggestion(entry: &Value) -> Option<CitySuggestion> {
    let name = text(entry, "name")?;
    let latitude = entry.get("lat").and_then(Value::as_f64).filter(|v| is_latitude(*v))?;
    let longitude = entry.get("lon").and_then(Value::as_f64).filter(|v| is_longitude(*v))?;

    let region = text(entry, "region").or_else(|| text(entry, "state"));
    let label = join_label(&[Some(name), region, text(entry, "country")]);

    Some(CitySuggestion { label, latitude, longitude })
}

/// Non-blank string field; anything else reads as absent.
fn text<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn join_label(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decodes the object at a JSON pointer, reported by its dotted path when
/// absent or shaped wrong.
fn decode_at<'a, T: Deserialize<'a>>(payload: &'a Value, pointer: &str) -> Result<T> {
    payload
        .pointer(pointer)
        .filter(|v| v.is_object())
        .and_then(|v| T::deserialize(v).ok())
        .ok_or_else(|| AdapterError::missing_field(dotted(pointer)))
}

fn dotted(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}
