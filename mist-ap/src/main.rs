//! Sound player (mist-ap) - Main entry point
//!
//! Serves catalog search and sound playback over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mist_ap::{api, service::SoundService};
use mist_common::config::{self, PlayerSettings, SettingsOverrides};

const DEFAULT_PORT: u16 = 5760;

/// Command-line arguments for mist-ap
#[derive(Parser, Debug)]
#[command(name = "mist-ap")]
#[command(about = "Sound-effects catalog player")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "MIST_AP_PORT")]
    port: Option<u16>,

    /// Playback volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f32>,

    /// Wait for sounds to finish before answering play requests
    #[arg(long)]
    wait: Option<bool>,

    /// Enable duration estimates and sound details
    #[arg(long)]
    details: Option<bool>,

    /// Catalog base URL
    #[arg(long)]
    catalog_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mist_ap=info,mist_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "mist-ap {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let file_config = config::load_toml_config();
    let overrides = SettingsOverrides {
        volume: args.volume,
        wait: args.wait,
        extended_details: args.details,
        catalog_url: args.catalog_url.clone(),
    };
    let settings = PlayerSettings::resolve(&overrides, &file_config);
    let port = args.port.or(file_config.port).unwrap_or(DEFAULT_PORT);

    info!(
        "Volume {:.2}, wait {}, extended details {}, catalog {}",
        settings.volume, settings.wait, settings.extended_details, settings.catalog_url
    );

    let service = Arc::new(
        SoundService::from_settings(settings).context("Failed to initialize sound service")?,
    );

    let app = api::create_router(api::AppState { service, port });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
