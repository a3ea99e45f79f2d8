use crate::{
    Config, WeatherQuery,
    error::{AdapterError, Result},
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::{fmt::Debug, str::FromStr, time::Duration};

pub mod openweather;
pub mod weatherapi;

/// Which upstream schema a payload follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    WeatherApi,
    OpenWeather,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::WeatherApi => "weatherapi",
            ProviderKind::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderKind] {
        &[ProviderKind::WeatherApi, ProviderKind::OpenWeather]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::WeatherApi => weatherapi::DEFAULT_BASE_URL,
            ProviderKind::OpenWeather => openweather::DEFAULT_BASE_URL,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderKind {
    type Error = AdapterError;

    fn try_from(value: &str) -> Result<Self> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherapi" => Ok(ProviderKind::WeatherApi),
            "openweather" | "openweathermap" => Ok(ProviderKind::OpenWeather),
            _ => Err(AdapterError::invalid_input(format!(
                "Unknown provider '{value}'. Supported providers: weatherapi, openweather."
            ))),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        ProviderKind::try_from(s)
    }
}

/// Raw payloads backing a [`crate::WeatherReport`].
#[derive(Debug, Clone)]
pub struct RawReport {
    pub current: Value,
    pub forecast: Value,
}

/// Fetches raw provider JSON. Normalization happens elsewhere.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn kind(&self) -> ProviderKind;

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<Value>;

    async fn fetch_report(&self, query: &WeatherQuery) -> Result<RawReport>;

    async fn fetch_places(&self, text: &str) -> Result<Value>;
}

/// Connection settings shared by every provider implementation.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: kind.default_base_url().to_string(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub(crate) fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| AdapterError::provider(format!("failed to build HTTP client: {e}")))
    }
}

/// Sends `request` and decodes the body as JSON. Any failure along the way is
/// a provider error; `what` names the call in messages.
pub(crate) async fn fetch_json(request: RequestBuilder, what: &str) -> Result<Value> {
    let res = request
        .send()
        .await
        .map_err(|e| AdapterError::provider(format!("failed to send {what} request: {e}")))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| AdapterError::provider(format!("failed to read {what} response body: {e}")))?;

    if !status.is_success() {
        return Err(AdapterError::provider(format!(
            "{what} request failed with status {status}: {}",
            truncate_body(&body),
        )));
    }

    serde_json::from_str(&body)
        .map_err(|e| AdapterError::provider(format!("failed to parse {what} JSON: {e}")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Construct a provider from explicit settings.
pub fn provider_from_settings(
    kind: ProviderKind,
    settings: ProviderSettings,
) -> Result<Box<dyn WeatherProvider>> {
    let boxed: Box<dyn WeatherProvider> = match kind {
        ProviderKind::WeatherApi => Box::new(WeatherApiProvider::new(settings)?),
        ProviderKind::OpenWeather => Box::new(OpenWeatherProvider::new(settings)?),
    };

    Ok(boxed)
}

/// Construct a provider from config and explicit ProviderKind.
pub fn provider_from_config(
    kind: ProviderKind,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(kind).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{kind}'.\n\
                 Hint: run `wxnorm configure {kind}` and enter your API key."
        )
    })?;

    let mut settings = ProviderSettings::new(kind, api_key).with_timeout(config.timeout());
    if let Some(base_url) = config.provider_base_url(kind) {
        settings = settings.with_base_url(base_url);
    }

    Ok(provider_from_settings(kind, settings)?)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let kind = config.default_provider_id()?;
    provider_from_config(kind, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_kind_as_str_roundtrip() {
        for kind in ProviderKind::all() {
            let s = kind.as_str();
            let parsed = ProviderKind::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderKind::try_from("doesnotexist").unwrap_err();
        assert!(matches!(err, AdapterError::InvalidInput { .. }));
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn endpoint_joins_without_doubled_slashes() {
        let settings = ProviderSettings::new(ProviderKind::WeatherApi, "KEY")
            .with_base_url("http://localhost:1234/v1/");
        assert_eq!(settings.endpoint("/search.json"), "http://localhost:1234/v1/search.json");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn unreachable_host_is_provider_error() {
        // Nothing listens on port 1, so the connection is refused before any response.
        let settings = ProviderSettings::new(ProviderKind::WeatherApi, "KEY")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        let provider = provider_from_settings(ProviderKind::WeatherApi, settings).unwrap();

        match provider.fetch_places("Paris").await.unwrap_err() {
            AdapterError::Provider { message } => {
                assert!(message.contains("failed to send WeatherAPI search request"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderKind::OpenWeather, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `wxnorm configure"));
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderKind::WeatherApi, "KEY".to_string());

        let provider = default_provider_from_config(&cfg).expect("provider should build");
        assert_eq!(provider.kind(), ProviderKind::WeatherApi);
    }
}
