//! Provider descriptions and readiness states.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ProviderId;

/// Describes a registered provider for configuration surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,
    /// `false` for providers that exist only to reserve an identifier.
    pub enabled: bool,
    /// The provider's default configuration, serialized through its schema.
    pub default_config: serde_json::Value,
}

/// Readiness reported by an in-process model.
///
/// Distinct from reachability: the runtime is present, but the model may
/// still need to be downloaded before a session can be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    Ready,
    Downloadable,
    Downloading,
    Unavailable,
}

impl Availability {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ready => "ready",
            Self::Downloadable => "downloadable",
            Self::Downloading => "downloading",
            Self::Unavailable => "unavailable",
        })
    }
}
