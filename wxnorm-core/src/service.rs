use crate::{
    error::Result,
    model::{
        CitySuggestion, DEFAULT_SUGGESTION_LIMIT, NormalizedCurrent, WeatherQuery, WeatherReport,
    },
    normalize::{normalize_current, normalize_forecast, normalize_suggestions},
    provider::WeatherProvider,
};

/// Fetches through one provider and hands the payload to the normalizer.
///
/// Errors are returned as-is; there is no retry and no fallback data.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
    suggestion_limit: usize,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider, suggestion_limit: DEFAULT_SUGGESTION_LIMIT }
    }

    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    pub async fn current(&self, query: &WeatherQuery) -> Result<NormalizedCurrent> {
        let payload = self.provider.fetch_current(query).await?;
        normalize_current(self.provider.kind(), &payload, query.units())
    }

    /// Current conditions plus up to `query.forecast_horizon()` days.
    pub async fn report(&self, query: &WeatherQuery) -> Result<WeatherReport> {
        let kind = self.provider.kind();
        let raw = self.provider.fetch_report(query).await?;

        let current = normalize_current(kind, &raw.current, query.units())?;
        let mut forecast = normalize_forecast(kind, &raw.forecast, query.units())?;
        forecast.truncate(usize::from(query.forecast_horizon()));

        Ok(WeatherReport { current, forecast })
    }

    pub async fn suggest(&self, text: &str) -> Result<Vec<CitySuggestion>> {
        self.suggest_with_limit(text, self.suggestion_limit).await
    }

    /// Blank input short-circuits to an empty list without contacting the provider.
    pub async fn suggest_with_limit(&self, text: &str, limit: usize) -> Result<Vec<CitySuggestion>> {
        let text = text.trim();
        if text.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let payload = self.provider.fetch_places(text).await?;
        normalize_suggestions(self.provider.kind(), &payload, limit)
    }
}
