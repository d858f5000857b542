//! Ratebook tariff engine, headless server
//!
//! ```sh
//! # Run with default config (~/.config/ratebook/config.toml)
//! ratebook-service
//!
//! # Custom config path
//! ratebook-service --config /etc/ratebook/config.toml
//!
//! # Validate config without starting
//! ratebook-service --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ratebook::config::AppConfig;
use ratebook::server::{init_tracing, ServerHandle, ServerOptions};

/// Shipping tariff engine: rates, catalogs and per-client ratebooks.
#[derive(Parser, Debug)]
#[command(
    name = "ratebook-service",
    version,
    about = "Tariff resolution and propagation service",
    long_about = "Ratebook REST API server. Keeps client ratebooks in sync with the \
                  rate catalogs they subscribe to and resolves shipment tariffs.\n\n\
                  Default config: ~/.config/ratebook/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RATEBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the database URL.
    #[arg(long, env = "RATEBOOK_DATABASE_URL")]
    database_url: Option<String>,

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
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ratebook::default_config_path);

    let (mut config, load_error) = match AppConfig::load_or_default(&config_path) {
        Ok((_, Some(e))) if cli.check => {
            eprintln!("Configuration could not be read: {}", e);
            eprintln!("   Config file : {}", config_path.display());
            return ExitCode::FAILURE;
        }
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration is invalid: {}", e);
            eprintln!("   Config file : {}", config_path.display());
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }
    if let Some(url) = cli.database_url {
        info!("CLI override: database url");
        config.database.url = url;
    }

    if let Err(e) = config.validate() {
        error!("Configuration is invalid: {}", e);
        return ExitCode::FAILURE;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Identity    : {}", if config.security.enabled { "jwt" } else { "off" });
        return ExitCode::SUCCESS;
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    ExitCode::SUCCESS
}
