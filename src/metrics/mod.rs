use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Checkout outcomes and latency
// - Order status transitions
// - Tracking updates recorded
// - Notification delivery failures
// - Delivery estimate revisions
//
// Metrics live in a private registry; `render()` produces the text
// exposition format for whatever surface the host app exposes.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Checkout Metrics
    pub checkouts_total: IntCounterVec,
    pub checkout_duration: Histogram,

    // Order Lifecycle Metrics
    pub order_transitions_total: IntCounterVec,
    pub delivery_estimates_revised_total: IntCounter,

    // Tracking Metrics
    pub tracking_updates_total: IntCounterVec,

    // Notification Metrics
    pub notification_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Checkout Metrics
        let checkouts_total = IntCounterVec::new(
            Opts::new("checkouts_total", "Checkout attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(checkouts_total.clone()))?;

        let checkout_duration = Histogram::with_opts(
            HistogramOpts::new("checkout_duration_seconds", "Checkout duration including payment confirmation")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;
        registry.register(Box::new(checkout_duration.clone()))?;

        // Order Lifecycle Metrics
        let order_transitions_total = IntCounterVec::new(
            Opts::new("order_transitions_total", "Order status transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(order_transitions_total.clone()))?;

        let delivery_estimates_revised_total = IntCounter::new(
            "delivery_estimates_revised_total",
            "Delivery estimates replaced after order placement",
        )?;
        registry.register(Box::new(delivery_estimates_revised_total.clone()))?;

        // Tracking Metrics
        let tracking_updates_total = IntCounterVec::new(
            Opts::new("tracking_updates_total", "Tracking updates recorded"),
            &["status"],
        )?;
        registry.register(Box::new(tracking_updates_total.clone()))?;

        // Notification Metrics
        let notification_failures_total = IntCounter::new(
            "notification_failures_total",
            "Notifications the notifier failed to deliver",
        )?;
        registry.register(Box::new(notification_failures_total.clone()))?;

        Ok(Self {
            registry,
            checkouts_total,
            checkout_duration,
            order_transitions_total,
            delivery_estimates_revised_total,
            tracking_updates_total,
            notification_failures_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format of every registered metric
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Helper to record a checkout attempt (`succeeded`, `declined`, `rejected`, `failed`)
    pub fn record_checkout(&self, outcome: &str, duration_secs: f64) {
        self.checkouts_total.with_label_values(&[outcome]).inc();
        self.checkout_duration.observe(duration_secs);
    }

    pub fn record_transition(&self, from: &str, to: &str) {
        self.order_transitions_total.with_label_values(&[from, to]).inc();
    }

    pub fn record_tracking_update(&self, status: &str) {
        self.tracking_updates_total.with_label_values(&[status]).inc();
    }

    pub fn record_notification_failure(&self) {
        self.notification_failures_total.inc();
    }

    pub fn record_estimate_revision(&self) {
        self.delivery_estimates_revised_total.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        // labelled vectors only show up once observed; plain counters and histograms always do
        assert!(metrics.registry.gather().len() >= 3);
    }

    #[test]
    fn test_record_checkout() {
        let metrics = Metrics::new().unwrap();
        metrics.record_checkout("succeeded", 0.05);
        metrics.record_checkout("declined", 0.02);
        metrics.record_checkout("succeeded", 0.04);

        let gathered = metrics.registry.gather();
        let checkouts = gathered.iter().find(|m| m.name() == "checkouts_total").unwrap();
        assert_eq!(checkouts.metric.len(), 2); // Two different outcome labels
        assert_eq!(metrics.checkouts_total.with_label_values(&["succeeded"]).get(), 2);
    }

    #[test]
    fn test_record_transition() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transition("pending", "confirmed");
        metrics.record_transition("confirmed", "shipped");
        metrics.record_transition("pending", "confirmed");

        assert_eq!(metrics.order_transitions_total.with_label_values(&["pending", "confirmed"]).get(), 2);
        assert_eq!(metrics.order_transitions_total.with_label_values(&["confirmed", "shipped"]).get(), 1);
    }

    #[test]
    fn test_render_exposition_format() {
        let metrics = Metrics::new().unwrap();
        metrics.record_notification_failure();
        metrics.record_tracking_update("shipped");

        let text = metrics.render().unwrap();
        assert!(text.contains("notification_failures_total 1"));
        assert!(text.contains("tracking_updates_total{status=\"shipped\"} 1"));
    }
}
