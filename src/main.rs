//! XMPP Resolution Service
//!
//! HTTP API exposing the connection metadata an XMPP client needs for a
//! domain, as published in DNS.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       XMPP RESOLV                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HTTP API (8080)       ←── GET /<domain>                    │
//! │  Resolver              ──→ SRV _xmpp-client._tcp.<domain>   │
//! │                        ──→ TXT _xmppconnect.<domain>        │
//! │  Metrics (optional)    ←── /health, /metrics                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached or persisted; every request resolves afresh and
//! responses carry a CRC-64 ETag plus a `Cache-Control` lifetime instead.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};

mod api;
mod config;
mod dns;
mod types;

use api::Metrics;
use config::ResolvConfig;
use dns::{HickorySource, RecordSource};

/// XMPP resolution API
#[derive(Parser, Debug)]
#[command(name = "xmpp-resolv")]
#[command(version)]
#[command(about = "HTTP API resolving XMPP client SRV and _xmppconnect TXT records", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "xmpp-resolv.toml")]
    config: PathBuf,

    /// Address for the lookup API
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Address for health and metrics endpoints
    #[arg(long)]
    metrics: Option<SocketAddr>,

    /// Cache-Control max-age in seconds
    #[arg(long)]
    max_age: Option<u32>,

    /// Ignore resolv.conf and use the resolver's default upstreams
    #[arg(long)]
    no_system_resolver: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into())
        )
        .init();

    // Load configuration
    let config = if args.config.exists() {
        ResolvConfig::load(&args.config)?
    } else {
        warn!("Config file {:?} not found, using defaults", args.config);
        ResolvConfig::default()
    };

    // Override config with CLI args
    let mut config = config
        .with_listen_addr(args.listen)
        .with_metrics_addr(args.metrics)
        .with_cache_max_age(args.max_age);
    if args.no_system_resolver {
        config = config.with_system_resolver(false);
    }

    config.validate()?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("🌐 XMPP resolution service v{}", env!("CARGO_PKG_VERSION"));
    info!("⚙️  Configuration:");
    info!("   Listen address: {}", config.listen_addr);
    info!("   Cache max-age: {}s", config.cache_max_age_secs);
    info!("   DNS timeout: {}s x{}", config.lookup_timeout_secs, config.lookup_attempts);

    // Fixed error bodies are encoded once, before serving
    LazyLock::force(&types::INTERNAL_ERROR_BODY);
    LazyLock::force(&types::NOT_FOUND_BODY);

    let shared_config = Arc::new(config);
    let source: Arc<dyn RecordSource> = Arc::new(HickorySource::from_config(&shared_config));
    let metrics = Arc::new(Metrics::new());

    let api_handle = tokio::spawn(api::run_api_server(
        shared_config.clone(),
        source,
        metrics.clone(),
    ));

    let metrics_handle = shared_config
        .metrics_addr
        .map(|addr| tokio::spawn(api::run_metrics_server(addr, metrics.clone())));

    info!("✅ Service started");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown signal received");
        }
        result = api_handle => {
            error!("Lookup API exited: {:?}", result);
        }
        result = async {
            match metrics_handle {
                Some(handle) => handle.await,
                None => std::future::pending().await,
            }
        } => {
            error!("Metrics server exited: {:?}", result);
        }
    }

    info!("👋 XMPP resolution service shutting down");
    Ok(())
}
