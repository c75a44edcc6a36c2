//! Norn - natural-language date interpretation
//!
//! This crate turns free-form date expressions ("next friday at 5pm",
//! "this weekend") into exact timestamps. A [`DateInterpreter`] routes each
//! request to one of several interchangeable providers: local OpenAI-compatible
//! servers (Ollama, LM Studio), an in-process on-device model, or a hosted
//! tier. When a provider is not configured yet, a grammar-based fallback
//! parser answers instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use norn::{DateInterpreter, InterpretationRequest, ProviderId};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> norn::Result<()> {
//!     let interpreter = DateInterpreter::builder().default_providers().build()?;
//!
//!     let request = InterpretationRequest::new("tomorrow at 3pm")
//!         .timezone("Europe/Oslo")
//!         .with_config(json!({ "baseUrl": "http://localhost:11434/v1", "model": "llama3.2" }));
//!
//!     let result = interpreter.interpret_date(ProviderId::Ollama, request).await?;
//!     println!("{} (via {})", result.instant()?, result.provider_id);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fallback;
pub mod interpreter;
pub mod providers;
#[cfg(feature = "cli")]
pub mod settings;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use error::{NornError, Result};
pub use fallback::{DateMatch, DateMatcher, EnglishDateMatcher, FallbackInterpreter, MatchOptions};
pub use interpreter::{DateInterpreter, DateInterpreterBuilder};
pub use providers::{DateProvider, DynDateProvider, ProviderConfig, ProviderRegistry};
pub use types::{Availability, DateInterpretation, InterpretationRequest, ProviderId, ProviderInfo};
pub use version::{PKG_VERSION, version_string};

pub use tokio_util::sync::CancellationToken;
