use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    model::{DEFAULT_FORECAST_DAYS, DEFAULT_SUGGESTION_LIMIT, UnitSystem},
    provider::ProviderKind,
};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the provider's public endpoint, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional default provider id, e.g. "weatherapi" or "openweather".
    pub default_provider: Option<String>,

    pub units: UnitSystem,
    pub suggestion_limit: usize,
    pub forecast_days: u8,
    pub timeout_secs: u64,

    /// Example TOML:
    /// [providers.weatherapi]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: None,
            units: UnitSystem::default(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            forecast_days: DEFAULT_FORECAST_DAYS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderKind.
    pub fn default_provider_id(&self) -> Result<ProviderKind> {
        let s = self.default_provider.as_ref().ok_or_else(|| {
            anyhow!(
                "No default provider configured.\n\
                 Hint: run `wxnorm configure <provider>` (e.g. `wxnorm configure weatherapi`) first."
            )
        })?;

        Ok(ProviderKind::try_from(s.as_str())?)
    }

    pub fn provider_config(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers.get(kind.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, kind: ProviderKind) {
        self.default_provider = Some(kind.as_str().to_string());
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load config from the platform path, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), providers = cfg.providers.len(), "loaded config");
        Ok(cfg)
    }

    /// Save config to the platform path, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wxnorm", "wxnorm-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key; the first provider configured becomes the default.
    pub fn upsert_provider_api_key(&mut self, kind: ProviderKind, api_key: String) {
        self.providers
            .entry(kind.as_str().to_string())
            .and_modify(|cfg| cfg.api_key = api_key.clone())
            .or_insert_with(|| ProviderConfig { api_key, base_url: None });

        if self.default_provider.is_none() {
            self.default_provider = Some(kind.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, kind: ProviderKind) -> Option<&str> {
        self.provider_config(kind).map(|cfg| cfg.api_key.as_str())
    }

    pub fn provider_base_url(&self, kind: ProviderKind) -> Option<&str> {
        self.provider_config(kind).and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_provider_configured(&self, kind: ProviderKind) -> bool {
        self.provider_api_key(kind).is_some()
    }
}
