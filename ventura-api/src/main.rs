use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ventura_api::{app, AppState};
use ventura_store::{MockPaymentProvider, SandboxSupplier};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ventura_api=debug,ventura_order=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ventura_store::Config::load().expect("Failed to load config");
    tracing::info!(
        partner_channel = %config.supplier.partner_channel_id,
        "Starting Ventura API on port {}",
        config.server.port
    );

    let supplier = Arc::new(SandboxSupplier::demo(config.sandbox.clone()).await);
    let payments = Arc::new(MockPaymentProvider::new(
        &config.payment.publishable_key,
        config.payment.skip_payment,
    ));
    let app_state = AppState::sandbox(supplier, payments, config.checkout.clone());

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
