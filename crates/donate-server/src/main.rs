//! donation-relay HTTP Server
//!
//! Axum-based server for the donation form, plus the background settlement
//! watcher. Both are wired from explicit configuration at startup; the
//! watcher is cancellable and joined on shutdown.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use donate_notify::{Mailer, SettlementWatcher, SmtpMailer, WatcherConfig};
use donate_payments::{DonationService, PaymentProvider, VenmoClient};

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Wire up the payment provider and mail transport
    let provider: Arc<dyn PaymentProvider> = Arc::new(VenmoClient::new(config.venmo.clone())?);
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&config.smtp)?);

    tracing::info!(provider = provider.name(), relay = %config.smtp.host, "Clients configured");

    // Background settlement watcher
    let cancel = CancellationToken::new();
    let watcher = SettlementWatcher::new(
        provider.clone(),
        mailer,
        WatcherConfig::new(config.poll_interval, config.admin_email.clone()),
    );
    let watcher_handle = tokio::spawn(watcher.run(cancel.clone()));

    // Build application state and router
    let state = AppState {
        donations: Arc::new(DonationService::new(provider, config.memo.clone())),
    };
    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("donation-relay server running on http://{}", config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health - Health check");
    tracing::info!("  GET  /donate - Donation form");
    tracing::info!("  POST /donate - Submit a donation");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the watcher and wait for it before exiting
    cancel.cancel();
    watcher_handle.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves when SIGINT (Ctrl+C) or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
