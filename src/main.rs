//! Ruster Graph - wallet connection analyzer
//!
//! Fetches the recent history of 2-5 Solana addresses (or reads it from a
//! JSON file) and reports how they are related: direct transfers, shared
//! counterparties, middlemen and time-proximate activity.

use clap::Parser;
use eyre::{eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ruster_graph::api::validate_addresses;
use ruster_graph::core::{AnalysisService, ConfidenceScore};
use ruster_graph::models::{AnalysisConfig, InsightConfig, ProviderConfig};
use ruster_graph::providers::{insight_from_config, SolanaClient, StaticProvider};
use ruster_graph::utils::constants::{
    DEFAULT_MAX_TRANSACTIONS, DEFAULT_TIME_WINDOW_SECS, ENV_MAX_TRANSACTIONS, ENV_TIME_WINDOW_SECS,
};
use ruster_graph::utils::{activities_from_json, write_report, TelemetryCollector};

#[derive(Parser, Debug)]
#[command(name = "ruster_graph", version, about = "Infer relationships between wallet addresses")]
struct Cli {
    /// Addresses to analyze (2-5). Optional with --input.
    addresses: Vec<String>,

    /// Transactions fetched per address
    #[arg(long, env = ENV_MAX_TRANSACTIONS, default_value_t = DEFAULT_MAX_TRANSACTIONS)]
    max_transactions: usize,

    /// Seconds between two interactions to count as time-proximate
    #[arg(long = "time-window", env = ENV_TIME_WINDOW_SECS, default_value_t = DEFAULT_TIME_WINDOW_SECS)]
    time_window: u64,

    /// Do not register invoked programs as graph nodes
    #[arg(long)]
    no_programs: bool,

    /// Read histories from a JSON file instead of RPC
    #[arg(long, value_name = "FILE.json")]
    input: Option<PathBuf>,

    /// Write connections_<ts>.json/.csv into this directory
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Add a narrative insight (remote when INSIGHT_API_KEY is set)
    #[arg(long)]
    insight: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = AnalysisConfig::from_env()
        .with_max_transactions(cli.max_transactions)
        .with_time_window(cli.time_window)
        .with_programs(!cli.no_programs);

    let telemetry = Arc::new(TelemetryCollector::new());

    let (addresses, report) = match &cli.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| eyre!("Cannot read {}: {}", path.display(), e))?;
            let activities = activities_from_json(&text, &cli.addresses)?;
            let addresses: Vec<String> = activities.iter().map(|a| a.address.clone()).collect();
            validate_addresses(&addresses).map_err(|e| eyre!(e.message))?;

            println!("📂 Loaded {} histories from {}", activities.len(), path.display());
            let service = AnalysisService::new(Arc::new(StaticProvider::default()), telemetry.clone());
            let report = service.analyze_offline(&activities, config);
            (addresses, report)
        }
        None => {
            let addresses = validate_addresses(&cli.addresses).map_err(|e| eyre!(e.message))?;
            let client = SolanaClient::new(ProviderConfig::from_env())?;
            println!("🔗 RPC endpoint: {}", client.masked_url());

            let service = AnalysisService::new(Arc::new(client), telemetry.clone());
            let report = service.analyze(&addresses, config).await?;
            (addresses, report)
        }
    };

    println!("{}", report.summary_text());

    let confidence = ConfidenceScore::calculate(&report.summary.pairs);
    println!("🧭 Verdict: {} ({}/100)", confidence.verdict(), confidence.total);

    if cli.insight {
        let generator = insight_from_config(InsightConfig::from_env());
        let text = generator.generate(&addresses, &report.summary).await;
        println!("\n💡 {}", text);
    }

    if let Some(dir) = &cli.export_dir {
        let (json, csv) = write_report(dir, &report)?;
        println!("\n💾 {}\n💾 {}", json.display(), csv.display());
    }

    println!("{}", telemetry.get_stats().summary());
    Ok(())
}
