use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use wxnorm_core::{
    Config, ProviderKind, UnitSystem, WeatherQuery, WeatherService,
    provider::{ProviderSettings, provider_from_config, provider_from_settings},
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxnorm", version, about = "Normalized weather and city lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Provider to use instead of the configured default.
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// API key for the selected provider, overriding the stored one for this run.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// WeatherAPI key overriding the stored one; ignored for other providers.
    #[arg(long, global = true, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub weatherapi_key: Option<String>,

    /// Print normalized records as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct Location {
    /// Latitude in degrees, -90..=90.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees, -180..=180.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// "metric" or "imperial"; defaults to the configured unit system.
    #[arg(long)]
    pub units: Option<UnitSystem>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "weatherapi" or "openweather".
        provider: String,
    },

    /// Show current temperature at a coordinate.
    Current {
        #[command(flatten)]
        location: Location,
    },

    /// Show current temperature and daily averages.
    Forecast {
        #[command(flatten)]
        location: Location,

        /// Number of days, 1..=14; defaults to the configured horizon.
        #[arg(long)]
        days: Option<u8>,
    },

    /// Suggest cities matching free text.
    Suggest {
        query: String,

        /// Maximum number of suggestions; defaults to the configured limit.
        #[arg(long)]
        limit: Option<usize>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match &self.command {
            Command::Configure { provider } => configure(config, provider),
            Command::Current { location } => {
                let query = location.query(&config)?;
                let current = self.service(&config)?.current(&query).await?;
                output::print_current(&current, self.json)
            }
            Command::Forecast { location, days } => {
                let query = location
                    .query(&config)?
                    .with_forecast_days(days.unwrap_or(config.forecast_days))?;
                let report = self.service(&config)?.report(&query).await?;
                output::print_report(&report, self.json)
            }
            Command::Suggest { query, limit } => {
                let limit = limit.unwrap_or(config.suggestion_limit);
                let suggestions = self.service(&config)?.suggest_with_limit(query, limit).await?;
                output::print_suggestions(&suggestions, self.json)
            }
        }
    }

    fn provider_kind(&self, config: &Config) -> anyhow::Result<ProviderKind> {
        let has_key = self.api_key.is_some() || self.weatherapi_key.is_some();
        match &self.provider {
            Some(name) => Ok(ProviderKind::try_from(name.as_str())?),
            // A key with nothing configured means WeatherAPI.
            None if has_key && config.default_provider.is_none() => Ok(ProviderKind::WeatherApi),
            None => config.default_provider_id(),
        }
    }

    /// Key given on the command line or via `WEATHER_API_KEY` for `kind`, if any.
    fn override_key(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::WeatherApi => self.api_key.as_deref().or(self.weatherapi_key.as_deref()),
            ProviderKind::OpenWeather => self.api_key.as_deref(),
        }
    }

    fn service(&self, config: &Config) -> anyhow::Result<WeatherService> {
        let kind = self.provider_kind(config)?;

        let provider = match self.override_key(kind) {
            Some(key) => {
                let mut settings =
                    ProviderSettings::new(kind, key).with_timeout(config.timeout());
                if let Some(base_url) = config.provider_base_url(kind) {
                    settings = settings.with_base_url(base_url);
                }
                provider_from_settings(kind, settings)?
            }
            None => provider_from_config(kind, config)?,
        };

        tracing::debug!(provider = %provider.kind(), "using provider");
        Ok(WeatherService::new(provider).with_suggestion_limit(config.suggestion_limit))
    }
}

impl Location {
    fn query(&self, config: &Config) -> anyhow::Result<WeatherQuery> {
        let units = self.units.unwrap_or(config.units);
        Ok(WeatherQuery::new(self.lat, self.lon, units)?)
    }
}

fn configure(mut config: Config, provider: &str) -> anyhow::Result<()> {
    let kind = ProviderKind::try_from(provider)?;

    let api_key = inquire::Password::new(&format!("API key for {kind}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim().to_string();
    anyhow::ensure!(!api_key.is_empty(), "API key must not be empty");

    let had_default = config.default_provider.is_some();
    config.upsert_provider_api_key(kind, api_key);

    if had_default && config.default_provider_id().ok() != Some(kind) {
        let make_default = inquire::Confirm::new(&format!("Make {kind} the default provider?"))
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if make_default {
            config.set_default_provider(kind);
        }
    }

    let path = config.save()?;
    println!("Saved {kind} credentials to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wxnorm").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn openweather_default() -> Config {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderKind::OpenWeather, "OW_STORED".into());
        cfg
    }

    #[test]
    fn weatherapi_key_is_not_sent_to_openweather() {
        let cli = parse(&["--weatherapi-key", "WA_ENV", "suggest", "Oslo"]);
        let cfg = openweather_default();

        let kind = cli.provider_kind(&cfg).unwrap();
        assert_eq!(kind, ProviderKind::OpenWeather);
        assert_eq!(cli.override_key(kind), None);
    }

    #[test]
    fn weatherapi_key_applies_to_weatherapi() {
        let cli = parse(&["--weatherapi-key", "WA_ENV", "--provider", "weatherapi", "suggest", "Oslo"]);
        let kind = cli.provider_kind(&openweather_default()).unwrap();
        assert_eq!(kind, ProviderKind::WeatherApi);
        assert_eq!(cli.override_key(kind), Some("WA_ENV"));
    }

    #[test]
    fn api_key_applies_to_selected_provider() {
        let cli = parse(&["--api-key", "ANY", "suggest", "Oslo"]);
        let kind = cli.provider_kind(&openweather_default()).unwrap();
        assert_eq!(cli.override_key(kind), Some("ANY"));
    }

    #[test]
    fn key_without_config_selects_weatherapi() {
        let cli = parse(&["--weatherapi-key", "WA_ENV", "current", "--lat", "-33.9", "--lon", "151.2"]);
        assert_eq!(cli.provider_kind(&Config::default()).unwrap(), ProviderKind::WeatherApi);
    }
}
