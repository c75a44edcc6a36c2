//! Settings file for the `norn` CLI.
//!
//! Settings are loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.norn/config.toml` (user)
//! 3. `/etc/norn/config.toml` (system)
//!
//! Unlike an explicit path, a missing user or system file is not an error:
//! every provider then sees an empty configuration and requests go to the
//! fallback parser.
//!
//! ```toml
//! provider = "ollama"
//! timezone = "Europe/Oslo"
//!
//! [providers.ollama]
//! baseUrl = "http://localhost:11434/v1"
//! model = "qwen2.5"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::types::ProviderId;
use crate::{NornError, Result};

/// Environment variables that fill in a provider's `apiKey` when the file has none.
const PROVIDER_ENV_VARS: &[(ProviderId, &str)] = &[(ProviderId::Cloud, "NORN_CLOUD_API_KEY")];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Provider used when none is given on the command line.
    #[serde(default)]
    pub provider: Option<ProviderId>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    /// Raw per-provider tables, keyed by provider id (`[providers.lm-studio]`).
    #[serde(default)]
    pub providers: HashMap<String, toml::Value>,
}

impl Settings {
    /// Load settings from the standard locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| NornError::Configuration(format!("Failed to parse settings: {e}")))
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            NornError::Configuration(format!("Failed to read settings file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            NornError::Configuration(format!("Failed to parse settings file {path:?}: {e}"))
        })
    }

    fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(NornError::Configuration(format!(
                "Settings file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user = home.join(".norn").join("config.toml");
            if user.exists() {
                return Ok(Some(user));
            }
        }

        let system = PathBuf::from("/etc/norn/config.toml");
        if system.exists() {
            return Ok(Some(system));
        }

        Ok(None)
    }

    /// The raw configuration for `provider`, as the dispatcher expects it.
    ///
    /// Returns `Value::Null` when the file has no table for the provider and
    /// no environment variable applies.
    pub fn provider_config(&self, provider: ProviderId) -> Value {
        let mut config = self
            .providers
            .get(provider.as_str())
            .and_then(|table| serde_json::to_value(table).ok())
            .unwrap_or(Value::Null);

        let env_key = PROVIDER_ENV_VARS
            .iter()
            .find(|(id, _)| *id == provider)
            .and_then(|(_, var)| std::env::var(var).ok());
        if let Some(key) = env_key {
            match &mut config {
                Value::Object(map) => {
                    map.entry("apiKey").or_insert(Value::String(key));
                }
                Value::Null => config = serde_json::json!({ "apiKey": key }),
                _ => {}
            }
        }
        config
    }
}
