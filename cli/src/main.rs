//! Tour booking service, CLI server
//!
//! Headless launcher suitable for a systemd unit, a container, or a shell.
//!
//! ```sh
//! # Run with default config (~/.config/tour-booking/config.toml)
//! tour-booking
//!
//! # Custom config path
//! tour-booking --config /etc/tour-booking/config.toml
//!
//! # Override the API port
//! tour-booking --api-port 8080
//!
//! # Validate config without starting
//! tour-booking --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use tour_booking::config::{AppConfig, CONFIG_PATH_ENV};
use tour_booking::server::{init_tracing, ServerHandle, ServerOptions};

/// Tour booking service: admission, pricing and capacity tracking.
#[derive(Parser, Debug)]
#[command(
    name = "tour-booking",
    version,
    about = "Tour booking admission and capacity service",
    long_about = "REST API server that admits, prices and tracks tour bookings.\n\n\
                  Default config: ~/.config/tour-booking/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(tour_booking::default_config_path);

    let loaded = AppConfig::load(&config_path);
    let load_error = loaded.as_ref().err().map(ToString::to_string);
    let mut config = loaded.unwrap_or_default();
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // Tracing goes up first so every later line is formatted
    init_tracing(&config);
    match &load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Some(e) = load_error {
            return Err(format!("{}: {}", config_path.display(), e).into());
        }
        if config.security.to_jwt_config().has_insecure_secret() {
            return Err("security.jwt_secret is blank or the built-in placeholder".into());
        }
        println!("✅ Configuration is valid");
        println!("   Config file   : {}", config_path.display());
        println!("   API address   : {}", config.api_address());
        println!("   Database      : {}", config.database.url);
        println!("   Log level     : {}", config.logging.level);
        println!(
            "   Notifications : {}",
            config.notifications.endpoint().unwrap_or("log only")
        );
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
