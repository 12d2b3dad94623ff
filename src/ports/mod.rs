// ============================================================================
// Ports - Boundaries to external collaborators
// ============================================================================
//
// The core never talks to a vendor SDK directly. Each collaborator is an
// object-safe async trait; `adapters::memory` ships an implementation of
// every one of them.
//
// Collaborator failures are `UpstreamError` and are propagated untouched.
// Nothing here retries.
//
// ============================================================================

pub mod identity;
pub mod store;
pub mod payment;
pub mod notifier;
pub mod geocoder;
pub mod subscription;

pub use identity::*;
pub use store::*;
pub use payment::*;
pub use notifier::*;
pub use geocoder::*;
pub use subscription::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("{service} unavailable: {message}")]
    Unavailable { service: &'static str, message: String },

    #[error("{service} rejected the request: {message}")]
    Rejected { service: &'static str, message: String },
}

impl UpstreamError {
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        UpstreamError::Unavailable { service, message: message.into() }
    }

    pub fn rejected(service: &'static str, message: impl Into<String>) -> Self {
        UpstreamError::Rejected { service, message: message.into() }
    }
}
