use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;
use super::UpstreamError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), UpstreamError>;
}

/// Fire-and-forget delivery: failures are logged and counted, never returned
pub async fn dispatch(notifier: &dyn Notifier, metrics: &Metrics, user_id: &str, notification: Notification) {
    let title = notification.title.clone();

    match notifier.notify(user_id, notification).await {
        Ok(()) => tracing::debug!(user_id, title = %title, "Notification sent"),
        Err(e) => {
            metrics.record_notification_failure();
            tracing::warn!(user_id, title = %title, error = %e, "Notification failed");
        }
    }
}
