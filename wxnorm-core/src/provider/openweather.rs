use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::Result,
    model::WeatherQuery,
    provider::{ProviderKind, ProviderSettings, RawReport, fetch_json},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Upper bound the direct geocoding endpoint accepts for `limit`.
const GEOCODE_MAX_RESULTS: &str = "5";

/// OpenWeatherMap: temperatures come back already converted to the unit
/// system named in the `units` query parameter.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    settings: ProviderSettings,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let http = settings.http_client()?;
        Ok(Self { settings, http })
    }

    async fn fetch_at(&self, path: &str, query: &WeatherQuery, what: &str) -> Result<Value> {
        let url = self.settings.endpoint(path);
        let lat = query.latitude().to_string();
        let lon = query.longitude().to_string();
        tracing::debug!(%url, %lat, %lon, units = %query.units(), "requesting {what}");

        let request = self.http.get(url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("units", query.units().as_str()),
            ("appid", self.settings.api_key.as_str()),
        ]);

        fetch_json(request, what).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenWeather
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<Value> {
        self.fetch_at("data/2.5/weather", query, "OpenWeather current").await
    }

    async fn fetch_report(&self, query: &WeatherQuery) -> Result<RawReport> {
        let (current, forecast) = tokio::try_join!(
            self.fetch_at("data/2.5/weather", query, "OpenWeather current"),
            self.fetch_at("data/2.5/forecast", query, "OpenWeather forecast"),
        )?;

        Ok(RawReport { current, forecast })
    }

    async fn fetch_places(&self, text: &str) -> Result<Value> {
        let url = self.settings.endpoint("geo/1.0/direct");
        tracing::debug!(%url, q = text, "requesting OpenWeather geocoding");

        // Ask for the provider maximum; filtering and the real cap happen locally.
        let request = self.http.get(url).query(&[
            ("q", text),
            ("limit", GEOCODE_MAX_RESULTS),
            ("appid", self.settings.api_key.as_str()),
        ]);

        fetch_json(request, "OpenWeather geocoding").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AdapterError, model::UnitSystem};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn provider(server: &MockServer) -> OpenWeatherProvider {
        let settings =
            ProviderSettings::new(ProviderKind::OpenWeather, "OW_KEY").with_base_url(server.uri());
        OpenWeatherProvider::new(settings).expect("client should build")
    }

    #[tokio::test]
    async fn fetch_current_passes_units_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "59.91"))
            .and(query_param("lon", "10.75"))
            .and(query_param("units", "imperial"))
            .and(query_param("appid", "OW_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "main": { "temp": 30.2 } })))
            .expect(1)
            .mount(&server)
            .await;

        let query = WeatherQuery::new(59.91, 10.75, UnitSystem::Imperial).unwrap();
        let payload = provider(&server).fetch_current(&query).await.unwrap();
        assert_eq!(payload["main"]["temp"], 30.2);
    }

    #[tokio::test]
    async fn fetch_report_combines_both_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "main": { "temp": 5.0 } })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "list": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let query = WeatherQuery::new(0.0, 0.0, UnitSystem::Metric).unwrap();
        let raw = provider(&server).fetch_report(&query).await.unwrap();
        assert_eq!(raw.current["main"]["temp"], 5.0);
        assert!(raw.forecast["list"].is_array());
    }

    #[tokio::test]
    async fn fetch_report_fails_when_forecast_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "main": { "temp": 5.0 } })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let query = WeatherQuery::new(0.0, 0.0, UnitSystem::Metric).unwrap();
        let err = provider(&server).fetch_report(&query).await.unwrap_err();
        assert!(matches!(err, AdapterError::Provider { .. }));
        assert!(err.to_string().contains("OpenWeather forecast"));
    }

    #[tokio::test]
    async fn fetch_places_requests_provider_maximum() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Springfield"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let payload = provider(&server).fetch_places("Springfield").await.unwrap();
        assert_eq!(payload, json!([]));
    }
}
