use tokio::task::JoinHandle;

// ============================================================================
// Subscription - teardown handle for a live feed
// ============================================================================

/// Owns the task that drives a live feed. Dropping the handle or calling
/// [`Subscription::unsubscribe`] aborts the task.
#[derive(Debug)]
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn from_task(handle: JoinHandle<()>) -> Self {
        Self { handle: Some(handle) }
    }

    /// A handle with nothing behind it, for feeds that could not be opened
    pub fn inactive() -> Self {
        Self { handle: None }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
