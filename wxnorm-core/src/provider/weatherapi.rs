use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::Result,
    model::WeatherQuery,
    provider::{ProviderKind, ProviderSettings, RawReport, fetch_json},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// WeatherAPI.com: one payload carries both `temp_c` and `temp_f`, so the
/// unit system is never sent upstream.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    settings: ProviderSettings,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let http = settings.http_client()?;
        Ok(Self { settings, http })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::WeatherApi
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<Value> {
        let url = self.settings.endpoint("current.json");
        tracing::debug!(%url, q = %query.coordinates(), "requesting WeatherAPI current");

        let request = self.http.get(url).query(&[
            ("key", self.settings.api_key.as_str()),
            ("q", query.coordinates().as_str()),
            ("aqi", "no"),
        ]);

        fetch_json(request, "WeatherAPI current").await
    }

    async fn fetch_report(&self, query: &WeatherQuery) -> Result<RawReport> {
        let url = self.settings.endpoint("forecast.json");
        let days = query.forecast_horizon().to_string();
        tracing::debug!(%url, q = %query.coordinates(), %days, "requesting WeatherAPI forecast");

        let request = self.http.get(url).query(&[
            ("key", self.settings.api_key.as_str()),
            ("q", query.coordinates().as_str()),
            ("days", days.as_str()),
            ("aqi", "no"),
            ("alerts", "no"),
        ]);

        let payload = fetch_json(request, "WeatherAPI forecast").await?;

        // forecast.json embeds the `current` block next to `forecast`.
        Ok(RawReport { current: payload.clone(), forecast: payload })
    }

    async fn fetch_places(&self, text: &str) -> Result<Value> {
        let url = self.settings.endpoint("search.json");
        tracing::debug!(%url, q = text, "requesting WeatherAPI search");

        let request =
            self.http.get(url).query(&[("key", self.settings.api_key.as_str()), ("q", text)]);

        fetch_json(request, "WeatherAPI search").await
    }
}
