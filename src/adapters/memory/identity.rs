use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ports::{AuthError, AuthSession, IdentityProvider, UpstreamError};

/// Consecutive failures before an email is locked out
const MAX_FAILED_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    password: String,
    disabled: bool,
}

/// Credential table keyed by lower-cased email
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    accounts: HashMap<String, Account>,
    failed_attempts: Mutex<HashMap<String, u32>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                user_id: Uuid::new_v4().simple().to_string(),
                password: password.to_string(),
                disabled: false,
            },
        );
        self
    }

    pub fn with_disabled_account(mut self, email: &str, password: &str) -> Self {
        self = self.with_account(email, password);
        if let Some(account) = self.accounts.get_mut(&email.to_lowercase()) {
            account.disabled = true;
        }
        self
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, UpstreamError> {
        let key = email.trim().to_lowercase();
        if !looks_like_email(&key) {
            return Err(AuthError::InvalidEmail.into());
        }

        let mut failed = self.failed_attempts.lock().await;
        if failed.get(&key).copied().unwrap_or(0) >= MAX_FAILED_ATTEMPTS {
            return Err(AuthError::RateLimited.into());
        }

        let account = self.accounts.get(&key).ok_or(AuthError::UnknownAccount)?;
        if account.disabled {
            return Err(AuthError::AccountDisabled.into());
        }
        if account.password != password {
            *failed.entry(key).or_insert(0) += 1;
            return Err(AuthError::InvalidCredentials.into());
        }

        failed.remove(&key);
        tracing::debug!(user_id = %account.user_id, "User authenticated");

        Ok(AuthSession {
            user_id: account.user_id.clone(),
            email: key,
            token: Uuid::new_v4().simple().to_string(),
        })
    }
}
