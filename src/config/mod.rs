//! Configuration system (layered: code > env > config file).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StructuraError};
use crate::models::LanguageModel;
use crate::types::GenerationSettings;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "openai:gpt-4o-mini";

const ENV_API_KEY: &str = "OPENAI_API_KEY";
const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_MODEL: &str = "STRUCTURA_MODEL";
const ENV_TEMPERATURE: &str = "STRUCTURA_TEMPERATURE";
const ENV_MAX_TOKENS: &str = "STRUCTURA_MAX_TOKENS";
const ENV_CONFIG_PATH: &str = "STRUCTURA_CONFIG";

/// Layered configuration for Structura.
///
/// Resolution order, highest first:
/// 1. Values set in code (`with_*`)
/// 2. Environment variables, after loading `.env` if present
/// 3. The TOML config file
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuraConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl fmt::Debug for StructuraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuraConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl StructuraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the full stack: config file, then `.env` and the process environment.
    ///
    /// The file is `$STRUCTURA_CONFIG` if set, otherwise [`default_config_path`].
    /// Only the default file may be absent; a `$STRUCTURA_CONFIG` that cannot
    /// be read is an error, as is a malformed file.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let file = match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::new(),
            },
        };
        Ok(file.merged_with(Self::from_lookup(|key| std::env::var(key).ok())?))
    }

    /// Load from environment variables only (after loading `.env`).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup, using the environment variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let temperature = lookup(ENV_TEMPERATURE)
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|e| {
                    StructuraError::Configuration(format!("{ENV_TEMPERATURE}='{raw}': {e}"))
                })
            })
            .transpose()?;
        let max_tokens = lookup(ENV_MAX_TOKENS)
            .map(|raw| {
                raw.trim().parse::<u32>().map_err(|e| {
                    StructuraError::Configuration(format!("{ENV_MAX_TOKENS}='{raw}': {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            api_key: lookup(ENV_API_KEY).filter(|v| !v.is_empty()),
            base_url: lookup(ENV_BASE_URL).filter(|v| !v.is_empty()),
            model: lookup(ENV_MODEL).filter(|v| !v.is_empty()),
            temperature,
            max_tokens,
        })
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config file");
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| StructuraError::Configuration(format!("{}: {e}", path.display())))
    }

    /// Parse TOML config text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| StructuraError::Configuration(e.to_string()))
    }

    /// Overlay `higher` on top of `self`; any value set in `higher` wins.
    pub fn merged_with(self, higher: Self) -> Self {
        Self {
            api_key: higher.api_key.or(self.api_key),
            base_url: higher.base_url.or(self.base_url),
            model: higher.model.or(self.model),
            temperature: higher.temperature.or(self.temperature),
            max_tokens: higher.max_tokens.or(self.max_tokens),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Check if credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// The configured model, or [`DEFAULT_MODEL`].
    pub fn language_model(&self) -> Result<LanguageModel> {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL).parse()
    }

    /// Default generation settings derived from this config.
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }
}

/// Platform config location, e.g. `~/.config/structura/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "structura")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn lookup_reads_known_variables() {
        let config = StructuraConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("STRUCTURA_MODEL", "openai:gpt-4o"),
            ("STRUCTURA_TEMPERATURE", "0.8"),
            ("STRUCTURA_MAX_TOKENS", "256"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.model.as_deref(), Some("openai:gpt-4o"));
        assert_eq!(config.temperature, Some(0.8));
        assert_eq!(config.max_tokens, Some(256));
    }

    #[test]
    fn bad_numeric_variable_is_configuration_error() {
        let err =
            StructuraConfig::from_lookup(lookup_from(&[("STRUCTURA_TEMPERATURE", "warm")]))
                .unwrap_err();
        assert!(matches!(err, StructuraError::Configuration(msg) if msg.contains("STRUCTURA_TEMPERATURE")));
    }

    #[test]
    fn empty_api_key_counts_as_unset() {
        let config =
            StructuraConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "")])).unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn higher_layer_wins_and_lower_fills_gaps() {
        let file = StructuraConfig::new()
            .with_model("openai:gpt-4")
            .with_temperature(0.2);
        let env = StructuraConfig::new().with_temperature(0.9).with_api_key("k");
        let merged = file.merged_with(env);

        assert_eq!(merged.model.as_deref(), Some("openai:gpt-4"));
        assert_eq!(merged.temperature, Some(0.9));
        assert_eq!(merged.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = StructuraConfig::new().with_api_key("sk-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn language_model_falls_back_to_default() {
        let model = StructuraConfig::new().language_model().unwrap();
        assert_eq!(model.to_string(), DEFAULT_MODEL);
    }

    #[test]
    fn settings_carry_sampling_defaults() {
        let settings = StructuraConfig::new()
            .with_temperature(0.8)
            .with_max_tokens(64)
            .settings();
        assert_eq!(settings.temperature, Some(0.8));
        assert_eq!(settings.max_tokens, Some(64));
        assert!(settings.response_format.is_none());
    }
}
