//! FTS payment verification service.
//!
//! Hosts the two trusted payment functions: order creation against the
//! provider (using the server-held secret) and callback signature
//! verification. Everything else in this crate runs client-side; this
//! binary is the one place the secret lives.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use fts_client::config::{load_config, ClientConfig};
use fts_client::observability::{logging, metrics};
use fts_client::payment::server::{app, PaymentServiceState};
use fts_client::payment::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config path as first argument; defaults otherwise.
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => ClientConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("fts-payments v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // The in-memory store stands in for the managed database; a real
    // deployment supplies a BookingStore backed by it.
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(PaymentServiceState::from_env(&config, store));
    let router = app(state, Duration::from_millis(config.timeouts.default_ms));

    let listener = TcpListener::bind(&config.payment.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        provider = %config.payment.provider_api_base,
        "Payment service listening"
    );

    axum::serve(listener, router).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
