use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AdapterError, Result},
    model::NormalizedForecastDay,
};

use super::decode_at;

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    dt_txt: Option<String>,
    main: OwMain,
}

impl OwForecastEntry {
    /// `dt_txt` is "YYYY-MM-DD hh:mm:ss"; fall back to the `dt` epoch.
    fn date(&self) -> Option<String> {
        if let Some(date) = self.dt_txt.as_deref().and_then(|txt| txt.split_whitespace().next()) {
            return Some(date.to_string());
        }

        self.dt
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.date_naive().to_string())
    }
}

/// OpenWeather converts `main.temp` server-side from the `units` query
/// parameter, so no field selection happens here.
pub(super) fn current_temperature(payload: &Value) -> Result<f64> {
    let main: OwMain = decode_at(payload, "/main")?;
    main.temp.ok_or_else(|| AdapterError::missing_field("main.temp"))
}

/// Groups the 3-hourly `list` by calendar date (UTC) in first-seen order and
/// averages `main.temp` per date.
pub(super) fn forecast_days(payload: &Value) -> Result<Vec<NormalizedForecastDay>> {
    let Some(list) = payload.get("list") else {
        return Ok(Vec::new());
    };
    let list = list.as_array().ok_or_else(|| AdapterError::missing_field("list"))?;

    let mut buckets: Vec<(String, f64, u32)> = Vec::new();

    for (idx, raw) in list.iter().enumerate() {
        let entry = OwForecastEntry::deserialize(raw).ok();
        let (Some(date), Some(temp)) = (
            entry.as_ref().and_then(OwForecastEntry::date),
            entry.as_ref().and_then(|e| e.main.temp),
        ) else {
            tracing::warn!(index = idx, "skipping malformed OpenWeather forecast entry");
            continue;
        };

        match buckets.iter_mut().find(|(d, _, _)| *d == date) {
            Some((_, sum, count)) => {
                *sum += temp;
                *count += 1;
            }
            None => buckets.push((date, temp, 1)),
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(date, sum, count)| NormalizedForecastDay {
            date,
            average_temperature: sum / f64::from(count),
        })
        .collect())
}
