use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{Notification, Notifier, UpstreamError};

/// Keeps every notification it is asked to send
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// (user id, notification) pairs in send order
    pub async fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().await.clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), UpstreamError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError::unavailable("push service", "no device token"));
        }

        tracing::info!(user_id, title = %notification.title, body = %notification.body, "Push notification");
        self.sent.lock().await.push((user_id.to_string(), notification));
        Ok(())
    }
}
