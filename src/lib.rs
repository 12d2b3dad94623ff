//! Engineering core of a mobile storefront: cart pricing, the order
//! lifecycle with its tracking feed, and delivery-time estimation.
//!
//! Collaborators (identity, document store, payments, push, geocoding) sit
//! behind the async traits in [`ports`]; [`adapters::memory`] implements all
//! of them in memory.

pub mod config;
pub mod error;
pub mod event_sourcing;
pub mod domain;
pub mod ports;
pub mod adapters;
pub mod metrics;

pub use config::{AppConfig, ConfigError, DeliveryConfig, PricingConfig};
pub use error::{CoreError, CoreResult};
