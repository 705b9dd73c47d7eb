//! Ruster Graph API Server
//!
//! REST API for wallet connection analysis
//!
//! Usage:
//!   cargo run --bin ruster_graph_api
//!
//! Environment:
//!   PORT / RUSTER_PORT - Server port (default: 3000)
//!   RUSTER_HOST        - Server host (default: 0.0.0.0)
//!   SOLANA_RPC_URL     - RPC endpoint (or ALCHEMY_API_KEY)
//!   INSIGHT_API_KEY    - Enables remote insight generation
//!   RUST_LOG           - Log filter (default: info)

use ruster_graph::api::{create_router, start_cleanup_task, AppState};
use ruster_graph::utils::constants::{DEFAULT_API_HOST, DEFAULT_API_PORT, ENV_HOST, ENV_PORT, ENV_RUSTER_PORT};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let state = Arc::new(AppState::from_env()?);
    state.spawn_cache_cleanup();
    let telemetry = state.telemetry.clone();

    start_cleanup_task();
    info!("🧹 Background cleanup tasks started");

    let app = create_router(state);

    // PORT is set by hosting platforms, RUSTER_PORT for local dev
    let host = std::env::var(ENV_HOST).unwrap_or_else(|_| DEFAULT_API_HOST.to_string());
    let port: u16 = std::env::var(ENV_PORT)
        .or_else(|_| std::env::var(ENV_RUSTER_PORT))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_API_PORT);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 Ruster Graph API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/analyze           - Fetch and analyze 2-5 addresses");
    info!("  POST /v1/analyze/offline   - Analyze supplied transaction records");
    info!("  POST /v1/export/csv        - Pair evidence as CSV");
    info!("  GET  /v1/stats             - Analysis statistics");
    info!("  GET  /v1/health            - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received");
    let stats = telemetry.get_stats();
    info!("   Analyses: {} ({} failed)", stats.total_analyses, stats.failed_analyses);
    info!("   Transactions scanned: {}", stats.transactions_scanned);
    info!("   Pairs found: {}", stats.pairs_found);

    match telemetry.export_stats_csv(std::path::Path::new("./telemetry")) {
        Ok(path) => info!("   ✅ Stats appended to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    info!("👋 Ruster Graph API shutdown complete");
    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║                                              ║
    ║          🕸️  R U S T E R   G R A P H          ║
    ║                                              ║
    ║            C O N N E C T I O N   A P I       ║
    ║      Wallet relationship inference v0.1.0    ║
    ║                                              ║
    ╚══════════════════════════════════════════════╝
    "#
    );
}
