//! Provider identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::NornError;

/// Closed set of backend identifiers, plus the reserved [`ProviderId::Fallback`].
///
/// `Fallback` never names a registered provider. It only appears as the
/// `provider_id` of results produced by the grammar-based fallback parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    /// Local Ollama server (OpenAI-compatible endpoint).
    Ollama,
    /// Local LM Studio server (OpenAI-compatible endpoint).
    LmStudio,
    /// In-process on-device model session.
    OnDevice,
    /// Hosted tier, not yet available.
    Cloud,
    /// Sentinel for results produced by the fallback parser.
    Fallback,
}

impl ProviderId {
    /// Every model-backed identifier, excluding the fallback sentinel.
    pub const BACKENDS: [ProviderId; 4] = [
        ProviderId::Ollama,
        ProviderId::LmStudio,
        ProviderId::OnDevice,
        ProviderId::Cloud,
    ];

    /// Stable string form, as used in configuration files and serialized results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::LmStudio => "lm-studio",
            Self::OnDevice => "on-device",
            Self::Cloud => "cloud",
            Self::Fallback => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = NornError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "lm-studio" | "lmstudio" => Ok(Self::LmStudio),
            "on-device" | "ondevice" => Ok(Self::OnDevice),
            "cloud" => Ok(Self::Cloud),
            "fallback" => Ok(Self::Fallback),
            _ => Err(NornError::UnknownProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_round_trips_through_from_str() {
        for id in ProviderId::BACKENDS {
            assert_eq!(id.as_str().parse::<ProviderId>().unwrap(), id);
        }
        assert_eq!("fallback".parse::<ProviderId>().unwrap(), ProviderId::Fallback);
    }

    #[test]
    fn accepts_unhyphenated_aliases() {
        assert_eq!("LMStudio".parse::<ProviderId>().unwrap(), ProviderId::LmStudio);
        assert_eq!("ondevice".parse::<ProviderId>().unwrap(), ProviderId::OnDevice);
    }

    #[test]
    fn unknown_string_is_unknown_provider() {
        let err = "openai".parse::<ProviderId>().unwrap_err();
        assert!(matches!(err, NornError::UnknownProvider(ref s) if s == "openai"));
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ProviderId::LmStudio).unwrap();
        assert_eq!(json, "\"lm-studio\"");
        let parsed: ProviderId = serde_json::from_str("\"on-device\"").unwrap();
        assert_eq!(parsed, ProviderId::OnDevice);
    }
}
