//! # Waypost - Auth Backend
//!
//! Thin HTTP backend for the Waypost mobile app: slider CAPTCHA
//! challenges, OTP signup/reset flows, Google federated sign-in, and
//! email/password login.
//!
//! ## Architecture
//! ```text
//! Mobile App → Waypost → Managed user store (HTTP)
//!                 ↓     → Identity provider (tokeninfo)
//!         Challenge store → SMTP relay (OTP mail)
//!          (in-process)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod auth;
mod challenge;
mod config;
mod routes;
mod state;

use challenge::sweeper_worker;
use config::AppConfig;
use state::AppState;

/// Waypost auth backend
#[derive(Parser, Debug)]
#[command(name = "waypost")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/waypost.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// JWT signing secret (overrides config)
    #[arg(long, env = "SECRET_KEY")]
    jwt_secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up .env before anything reads the environment
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Waypost v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config, &args)?;
    info!("Configuration loaded from {}", args.config);

    // Shutdown broadcast for background workers
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let state = AppState::new(config.clone())?;

    // Expired-token sweeper (memory hygiene; expiry is also checked at verify)
    let sweep_store = state.challenges.clone();
    let sweep_interval = config.otp.sweep_interval_secs;
    let sweep_shutdown = shutdown_tx.subscribe();
    tokio::spawn(async move {
        sweeper_worker(sweep_store, sweep_interval, sweep_shutdown).await;
    });

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Waypost listening on {}", config.listen_addr);

    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Waypost shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}
