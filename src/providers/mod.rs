//! Date interpretation providers.
//!
//! Every backend implements [`DateProvider`]. Shared behaviour lives in
//! [`instruction`] (system instruction and output schema) and
//! [`normalize`] (turning backend output into a [`DateInterpretation`](crate::DateInterpretation)).

mod cancel;
pub mod cloud;
pub mod instruction;
pub mod lmstudio;
pub mod normalize;
pub mod ollama;
pub mod on_device;
pub mod openai_compat;
pub mod registry;
pub mod traits;

pub use cloud::{CloudConfig, CloudProvider};
pub use lmstudio::{LmStudioConfig, LmStudioProvider};
pub use ollama::{OllamaConfig, OllamaProvider};
pub use on_device::{ModelSession, OnDeviceConfig, OnDeviceModel, OnDeviceProvider, SessionOptions};
pub use openai_compat::OpenAiCompatClient;
pub use registry::ProviderRegistry;
pub use traits::{DateProvider, DynDateProvider, ProviderConfig};

use url::Url;

/// Check that `raw` is an absolute http(s) URL and return it without a trailing slash.
pub(crate) fn validate_base_url(raw: &str) -> std::result::Result<String, String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| format!("baseUrl is not a valid URL: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.trim_end_matches('/').to_string()),
        other => Err(format!("baseUrl must use http or https, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_accepts_http_and_https() {
        assert_eq!(
            validate_base_url(" https://models.lan/v1/ ").unwrap(),
            "https://models.lan/v1"
        );
        assert!(validate_base_url("http://127.0.0.1:11434").is_ok());
    }

    #[test]
    fn base_url_rejects_relative_and_other_schemes() {
        assert!(validate_base_url("/v1").is_err());
        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("file:///tmp/socket").is_err());
    }
}
