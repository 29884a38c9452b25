//! Numerology report HTTP server.
//!
//! Serves a single POST endpoint computing life path and name numbers from a
//! full name and birth date, behind an API-key gate and a per-client rate
//! limit. Keys are read from a JSON file on every request, so they can be
//! rotated without restarting the server.

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use numerology_server::{shutdown_signal, JsonFileKeyStore, NumerologyServer, ServerConfig};
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Command line arguments for the numerology server.
#[derive(Parser, Debug)]
#[command(name = "numerology-server")]
#[command(about = "A service that generates numerology reports based on name and birth date")]
#[command(version)]
struct Args {
    /// Server bind address
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Path to the JSON file mapping API keys to their status
    #[arg(long, default_value = "api_keys.json")]
    api_keys: PathBuf,

    /// Per-client request quota for the report endpoint, per minute
    #[arg(long, default_value = "10")]
    rate_limit: NonZeroU32,

    /// Enable CORS
    #[arg(long, default_value = "true")]
    cors: bool,

    /// CORS allowed origins (comma-separated)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    let log_level_filter = args.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let mut config = ServerConfig::default()
        .with_bind_addr_str(&args.bind)?
        .with_cors(args.cors)
        .with_rate_limit_per_minute(args.rate_limit);

    if let Some(origins) = args.cors_origins {
        let origins: Vec<String> = origins.split(',').map(|s| s.trim().to_string()).collect();
        config = config.with_cors_origins(origins);
    }

    log::info!("Reading API keys from {}", args.api_keys.display());
    let key_store = JsonFileKeyStore::new(args.api_keys);

    let server = NumerologyServer::with_config(key_store, config);

    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        log::error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
