//! Placeholder for the hosted tier.
//!
//! Registered so the identifier and its configuration shape exist, and so
//! configuration surfaces can show the tier as disabled. Every call fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{DateProvider, ProviderConfig};
use crate::types::{DateInterpretation, InterpretationRequest, ProviderId};
use crate::{NornError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfig {
    pub api_key: String,
}

impl ProviderConfig for CloudConfig {
    fn validate(&mut self) -> std::result::Result<(), String> {
        self.api_key = self.api_key.trim().to_string();
        if self.api_key.is_empty() {
            return Err("apiKey must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CloudProvider;

#[async_trait]
impl DateProvider for CloudProvider {
    type Config = CloudConfig;

    fn id(&self) -> ProviderId {
        ProviderId::Cloud
    }

    fn name(&self) -> &str {
        "Norn Cloud"
    }

    fn description(&self) -> &str {
        "Hosted interpretation (coming soon)"
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn interpret_date(
        &self,
        _request: InterpretationRequest<CloudConfig>,
    ) -> Result<DateInterpretation> {
        Err(NornError::NotYetAvailable(ProviderId::Cloud))
    }
}
