mod store;
mod payment;
mod notifier;
mod geocoder;
mod identity;

pub use store::MemoryStore;
pub use payment::MockPaymentProcessor;
pub use notifier::RecordingNotifier;
pub use geocoder::StaticGeocoder;
pub use identity::MemoryIdentityProvider;
