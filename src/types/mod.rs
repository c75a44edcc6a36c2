//! Public types for the Norn API.

mod interpretation;
mod provider_id;
mod provider_info;
mod request;

pub use interpretation::DateInterpretation;
pub use provider_id::ProviderId;
pub use provider_info::{Availability, ProviderInfo};
pub use request::InterpretationRequest;
