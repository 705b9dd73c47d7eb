//! Connection Analysis Demo
//!
//! Runs the engine over a hand-built set of histories: one direct transfer,
//! a shared exchange deposit address, and a busy relay wallet.
//!
//! Run with: cargo run --example connection_demo

use ruster_graph::core::ConfidenceScore;
use ruster_graph::utils::pairs_to_csv;
use ruster_graph::{AnalysisConfig, ConnectionAnalyzer, EntityActivity, TransactionRecord};

const ALICE: &str = "A1iceZ4kq8Y3xQh9cVwT2mPnR6sLdE7bFgJuKo5iWyXa";
const BOB: &str = "BobK7vR2nPq9xWt4mLs8cYh3dZj6fGe5aUo1iTkNwQrE";
const CAROL: &str = "CaroL3hT8kWm2qVx9nRp5sYd7cZf4gJe6bUa1oKiNwQs";
const EXCHANGE: &str = "ExchDep9sKq2mVt7xRw4nLp8cYh3dZj6fGe5aUo1iTkN";
const RELAY: &str = "ReLay5hT8kWm2qVx9nRp3sYd7cZf4gJe6bUa1oKiNwQm";
const JUPITER: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";

fn main() {
    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║                                              ║
    ║   🕸️ CONNECTION ANALYSIS DEMO                ║
    ║   Direct, shared, hub and timing evidence    ║
    ║                                              ║
    ╚══════════════════════════════════════════════╝
    "#
    );

    let t0 = 1_700_000_000;

    let activities = vec![
        EntityActivity::new(
            ALICE,
            vec![
                TransactionRecord::new("4aL1ceToB0bDirectSig", ALICE, t0).to(BOB),
                TransactionRecord::new("4aL1ceDeposit", ALICE, t0 + 600).to(EXCHANGE).via(JUPITER),
                TransactionRecord::new("4aL1ceRelay", ALICE, t0 + 3600).to(RELAY),
            ],
        ),
        EntityActivity::new(
            BOB,
            vec![
                TransactionRecord::new("3b0bDeposit", BOB, t0 + 640).to(EXCHANGE),
                TransactionRecord::new("3b0bRelay", BOB, t0 + 90_000).to(RELAY),
            ],
        ),
        EntityActivity::new(
            CAROL,
            vec![
                TransactionRecord::new("2car0lRelay", CAROL, t0 + 200_000).to(RELAY).via(JUPITER),
            ],
        ),
    ];

    let config = AnalysisConfig::default().with_time_window(120);
    println!("🔧 Window: {}s, programs: {}\n", config.time_window_seconds, config.include_programs);

    let report = ConnectionAnalyzer::new(config).analyze(&activities);

    println!("{}", report.summary_text());

    let confidence = ConfidenceScore::calculate(&report.summary.pairs);
    println!("🧭 Verdict: {} ({})", confidence.verdict(), confidence.color_code());
    for factor in &confidence.breakdown {
        println!("   +{:>2} {} [{}]", factor.points, factor.pair, factor.category.as_str());
    }

    match pairs_to_csv(&report.summary.pairs) {
        Ok(csv) => println!("\n📄 CSV export:\n{}", csv),
        Err(e) => eprintln!("❌ CSV export failed: {}", e),
    }

    match serde_json::to_string_pretty(&report.graph) {
        Ok(json) => println!("🗺️ Graph ({} bytes of JSON, {} nodes)", json.len(), report.graph.nodes.len()),
        Err(e) => eprintln!("❌ Failed to serialize graph: {}", e),
    }
}
