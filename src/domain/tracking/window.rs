use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::domain::order::OrderStatus;

// ============================================================================
// Delivery Window & Relative Time
// ============================================================================

/// Calendar-day bucket for an estimated delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryWindow {
    Today,
    Tomorrow,
    On(NaiveDate),
}

impl DeliveryWindow {
    pub fn from_estimate(estimate: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_estimate_in(estimate, now)
    }

    /// Same as [`DeliveryWindow::from_estimate`], comparing calendar days in `now`'s time zone
    pub fn from_estimate_in<Tz: TimeZone>(estimate: DateTime<Utc>, now: DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let day = estimate.with_timezone(&now.timezone()).date_naive();

        if day == today {
            DeliveryWindow::Today
        } else if today.succ_opt() == Some(day) {
            DeliveryWindow::Tomorrow
        } else {
            DeliveryWindow::On(day)
        }
    }
}

/// `"Today"`, `"Tomorrow"`, or e.g. `"Monday, Mar 3"`
impl fmt::Display for DeliveryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryWindow::Today => f.write_str("Today"),
            DeliveryWindow::Tomorrow => f.write_str("Tomorrow"),
            DeliveryWindow::On(date) => write!(f, "{}, {} {}", date.format("%A"), date.format("%b"), date.day()),
        }
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - timestamp;

    if elapsed < Duration::minutes(1) {
        "Just now".to_string()
    } else if elapsed < Duration::hours(1) {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed < Duration::days(1) {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

/// Push notification title for a tracking update
pub fn notification_title(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Confirmed => "📦 Order Confirmed",
        OrderStatus::Processing => "🏭 Order Processing",
        OrderStatus::Shipped => "🚚 Order Shipped",
        OrderStatus::Delivered => "✅ Order Delivered",
        OrderStatus::Cancelled => "❌ Order Cancelled",
        OrderStatus::Pending | OrderStatus::Refunded => "📋 Order Update",
    }
}
