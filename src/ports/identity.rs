use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::UpstreamError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Incorrect password")]
    InvalidCredentials,

    #[error("This account has been disabled")]
    AccountDisabled,

    #[error("No account found with this email")]
    UnknownAccount,

    #[error("Too many failed attempts. Please try again later")]
    RateLimited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Opaque id issued by the identity provider
    pub user_id: String,
    pub email: String,
    pub token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, UpstreamError>;
}
