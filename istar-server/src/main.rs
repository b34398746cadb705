//! iStar Gift Gateway Server
//!
//! An HTTP gateway that places star and premium gift orders with the iStar
//! provider and tracks their settlement through provider webhooks.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use istar_core::config::WebhookVerification;
use istar_core::services::{OrderOrchestrator, WebhookReconciler};
use istar_core::store::{MemoryOrderStore, OrderStore};
use istar_sdk::client::UpstreamClient;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// iStar Gift Gateway - star and premium gift ordering
#[derive(Parser, Debug)]
#[command(name = "istar-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "ISTAR_GATEWAY_CONFIG",
        default_value = "./istar-gateway.toml"
    )]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.log_json);

    tracing::info!("Starting istar-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    if loaded_config.webhook == WebhookVerification::Disabled {
        tracing::warn!("Webhook signature verification is DISABLED; any caller can settle orders");
    }

    let listen_addr = loaded_config.listen;
    tracing::info!(
        base_url = %loaded_config.upstream.base_url,
        timeout_secs = loaded_config.upstream.timeout.as_secs(),
        max_retries = loaded_config.upstream.max_retries,
        "Upstream provider configured"
    );
    let upstream = Arc::new(UpstreamClient::new(loaded_config.upstream).map_err(|e| {
        tracing::error!("Failed to build upstream client: {}", e);
        e
    })?);

    let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
    let orchestrator = OrderOrchestrator::new(upstream.clone(), store.clone());
    let reconciler = WebhookReconciler::new(loaded_config.webhook, store);

    // Create application state
    let state = AppState::new(
        orchestrator,
        reconciler,
        upstream,
        loaded_config.access_api_key,
    );

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader)?;

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,istar_core=info,reqwest=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
