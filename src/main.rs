use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use storefront_core::adapters::memory::{
    MemoryIdentityProvider, MemoryStore, MockPaymentProcessor, RecordingNotifier, StaticGeocoder,
};
use storefront_core::domain::cart::{Cart, Product, Variations};
use storefront_core::domain::geo::{EtaEstimator, GeoPoint};
use storefront_core::domain::money::format_amount;
use storefront_core::domain::order::{
    Address, CheckoutRequest, OrderCommandHandler, OrderStatus, PaymentMethod, PaymentMethodType,
};
use storefront_core::domain::tracking::{
    format_time_ago, DeliveryAgent, Location, TrackingCommandHandler, TrackingSession, TrackingUpdate, VehicleType,
};
use storefront_core::metrics::Metrics;
use storefront_core::ports::IdentityProvider;
use storefront_core::AppConfig;

const DEMO_EMAIL: &str = "demo@storefront.dev";
const DEMO_PASSWORD: &str = "demo-password";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront_core=debug,storefront_demo=debug")),
        )
        .init();

    tracing::info!("🚀 Starting storefront core demo");

    let config = AppConfig::from_env()?;
    tracing::info!(
        tax_rate = %config.pricing.tax_rate,
        free_shipping_threshold = %config.pricing.free_shipping_threshold,
        currency = %config.pricing.currency,
        "Configuration loaded"
    );

    // === 1. Collaborators ===
    let metrics = Arc::new(Metrics::new()?);
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let geocoder = Arc::new(
        StaticGeocoder::new()
            .with_place(GeoPoint::new(40.7128, -74.0060), "Warehouse, New York, NY")
            .with_place(GeoPoint::new(40.7589, -73.9851), "Fulfillment Center, New York, NY")
            .with_place(GeoPoint::new(40.7505, -73.9934), "Distribution Center, New York, NY"),
    );
    let identity = MemoryIdentityProvider::new().with_account(DEMO_EMAIL, DEMO_PASSWORD);

    let orders = Arc::new(OrderCommandHandler::new(
        store.clone(),
        Arc::new(MockPaymentProcessor::new()),
        notifier.clone(),
        config.clone(),
        metrics.clone(),
    ));
    let tracking = TrackingCommandHandler::new(store.clone(), orders.clone(), geocoder, notifier.clone(), metrics.clone());

    // === 2. Sign in ===
    let auth = identity.authenticate(DEMO_EMAIL, DEMO_PASSWORD).await?;
    tracing::info!(user_id = %auth.user_id, "Signed in");

    // === 3. Fill the cart ===
    let mut cart = Cart::new(config.pricing.clone());
    let headphones = Product::new("Wireless Headphones", "WH-1000", Decimal::new(7999, 2), 25);
    let tee = Product::new("Cotton T-Shirt", "TS-100", Decimal::new(1999, 2), 40);
    let medium: Variations = [("size".to_string(), "M".to_string())].into_iter().collect();

    cart.add(headphones, 1, Variations::new())?;
    let tee_line = cart.add(tee.clone(), 2, medium.clone())?;
    cart.add(tee, 1, medium)?;
    cart.set_quantity(tee_line, 2)?;
    cart.apply_discount(Decimal::new(10, 0))?;

    let totals = cart.totals();
    let currency = totals.currency;
    tracing::info!(
        items = totals.total_items,
        subtotal = %format_amount(totals.subtotal, currency),
        tax = %format_amount(totals.tax, currency),
        shipping = %format_amount(totals.shipping, currency),
        total = %format_amount(totals.total, currency),
        "Cart ready"
    );

    // === 4. Checkout ===
    let home = Address {
        id: Uuid::new_v4(),
        street: "350 5th Ave".to_string(),
        city: "New York".to_string(),
        state: "NY".to_string(),
        zip_code: "10118".to_string(),
        country: "US".to_string(),
        is_default: true,
        latitude: Some(40.7484),
        longitude: Some(-73.9857),
    };
    let card = PaymentMethod {
        id: "pm_card_visa".to_string(),
        method_type: PaymentMethodType::Card,
        last4: Some("4242".to_string()),
        brand: Some("visa".to_string()),
        expiry_month: Some(12),
        expiry_year: Some(2030),
        is_default: true,
    };

    let order = orders
        .checkout(
            &mut cart,
            CheckoutRequest {
                user_id: auth.user_id.clone(),
                shipping_address: home.clone(),
                billing_address: home,
                payment_method: card,
            },
        )
        .await?;
    tracing::info!(order_id = %order.id, tracking_number = %order.tracking_number, cart_empty = cart.is_empty(), "Checkout complete");

    // === 5. Courier and live tracking ===
    let courier = DeliveryAgent {
        id: Uuid::new_v4(),
        name: "Alex Rivera".to_string(),
        phone: "+1-555-0199".to_string(),
        vehicle_type: VehicleType::Van,
        current_location: GeoPoint::new(40.7505, -73.9934),
        is_active: true,
        assigned_orders: HashSet::from([order.id]),
        last_location_update: None,
    };
    store.put_agent(courier.clone()).await;

    let session = TrackingSession::start(store.as_ref(), &order, EtaEstimator::from_config(&config.delivery)).await;

    let now = Utc::now();
    let scans = [
        (OrderStatus::Confirmed, GeoPoint::new(40.7128, -74.0060), "Your order has been confirmed and is being prepared.", 4),
        (OrderStatus::Processing, GeoPoint::new(40.7589, -73.9851), "Your order is being packed and prepared for shipment.", 2),
        (OrderStatus::Shipped, GeoPoint::new(40.7505, -73.9934), "Your order has been shipped and is on its way!", 1),
    ];
    for (status, point, message, hours_ago) in scans {
        tracking
            .record_update(
                TrackingUpdate::new(order.id, status, message, now - Duration::hours(hours_ago))
                    .with_location(Location::new(point)),
            )
            .await?;
    }

    tracking.report_agent_location(courier.id, GeoPoint::new(40.7490, -73.9880)).await?;
    tokio::time::sleep(StdDuration::from_millis(100)).await;

    let view = session.view();
    tracing::info!(
        status = %view.status,
        route_points = view.route.len(),
        window = %view.delivery_window(Utc::now()).map(|w| w.to_string()).unwrap_or_default(),
        eta = ?view.estimated_delivery,
        "Tracking view"
    );
    for update in &view.updates {
        tracing::info!(
            status = %update.status,
            at = %format_time_ago(update.timestamp, Utc::now()),
            place = update.location.as_ref().and_then(|l| l.address.as_deref()).unwrap_or("-"),
            "{}",
            update.message
        );
    }
    session.stop();

    // === 6. Delivery ===
    orders.transition(order.id, OrderStatus::Delivered, Some("left at front desk".to_string())).await?;
    for placed in orders.list_orders(&auth.user_id).await? {
        tracing::info!(order_id = %placed.id, status = %placed.status, total = %format_amount(placed.totals.total, currency), "Order history");
    }

    tracing::info!(notifications = notifier.sent().await.len(), "Notifications delivered");
    tracing::info!("📊 Metrics:\n{}", metrics.render()?);

    Ok(())
}
