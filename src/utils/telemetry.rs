//! Telemetry Module
//!
//! In-process counters for analysis runs, served by the stats endpoint.
//! No addresses or signatures are kept, only aggregate numbers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::types::{AnalysisSummary, LinkCategory};

/// Aggregated statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    pub total_analyses: u64,
    pub failed_analyses: u64,
    pub transactions_scanned: u64,
    pub pairs_found: u64,
    /// Retained pairs by evidence type
    pub pairs_by_type: HashMap<String, u64>,
    pub avg_latency_ms: f64,
    pub period_start: u64,
    pub period_end: u64,
}

impl TelemetryStats {
    /// Human-readable box summary for the CLI
    pub fn summary(&self) -> String {
        let period_minutes = self.period_end.saturating_sub(self.period_start) / 60;

        format!(
            r#"
╔══════════════════════════════════════════════╗
║         🕸️ RUSTER GRAPH - SESSION STATS      ║
╠══════════════════════════════════════════════╣
║   📊 Period:                {:>10} min      ║
║   🔍 Analyses:              {:>10}          ║
║   ❌ Failed:                {:>10}          ║
║   📜 Transactions Scanned:  {:>10}          ║
║   🔗 Pairs Found:           {:>10}          ║
║   ⚡ Avg Latency:           {:>10.2}ms      ║
╚══════════════════════════════════════════════╝
"#,
            period_minutes,
            self.total_analyses,
            self.failed_analyses,
            self.transactions_scanned,
            self.pairs_found,
            self.avg_latency_ms,
        )
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.2}\n",
            self.period_start,
            self.period_end,
            self.total_analyses,
            self.failed_analyses,
            self.transactions_scanned,
            self.pairs_found,
            self.avg_latency_ms,
        )
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_analyses: AtomicU64,
    failed_analyses: AtomicU64,
    transactions_scanned: AtomicU64,
    pairs_found: AtomicU64,
    total_latency_ms: AtomicU64,
    pair_counts: RwLock<HashMap<LinkCategory, u64>>,
    session_start: u64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_analyses: AtomicU64::new(0),
            failed_analyses: AtomicU64::new(0),
            transactions_scanned: AtomicU64::new(0),
            pairs_found: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            pair_counts: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
        }
    }

    /// Record a completed analysis
    pub fn record_analysis(&self, summary: &AnalysisSummary, latency_ms: u64) {
        self.total_analyses.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.transactions_scanned
            .fetch_add(summary.total_transactions_scanned, Ordering::Relaxed);
        self.pairs_found
            .fetch_add(summary.pairs.len() as u64, Ordering::Relaxed);

        if let Ok(mut counts) = self.pair_counts.write() {
            for pair in &summary.pairs {
                *counts.entry(pair.category).or_insert(0) += 1;
            }
        }
    }

    /// Record an analysis that produced no report
    pub fn record_failure(&self, latency_ms: u64) {
        self.total_analyses.fetch_add(1, Ordering::Relaxed);
        self.failed_analyses.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total_analyses = self.total_analyses.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if total_analyses > 0 {
            total_latency as f64 / total_analyses as f64
        } else {
            0.0
        };

        let pairs_by_type = self
            .pair_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            total_analyses,
            failed_analyses: self.failed_analyses.load(Ordering::Relaxed),
            transactions_scanned: self.transactions_scanned.load(Ordering::Relaxed),
            pairs_found: self.pairs_found.load(Ordering::Relaxed),
            pairs_by_type,
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Append current stats to `telemetry_history.csv` in `dir`
    pub fn export_stats_csv(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(dir)?;
        let stats = self.get_stats();
        let path = dir.join("telemetry_history.csv");

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        if file.metadata()?.len() == 0 {
            writeln!(
                file,
                "period_start,period_end,total_analyses,failed_analyses,transactions_scanned,pairs_found,avg_latency_ms"
            )?;
        }

        write!(file, "{}", stats.to_csv_row())?;

        Ok(path)
    }

    pub fn reset(&self) {
        self.total_analyses.store(0, Ordering::Relaxed);
        self.failed_analyses.store(0, Ordering::Relaxed);
        self.transactions_scanned.store(0, Ordering::Relaxed);
        self.pairs_found.store(0, Ordering::Relaxed);
        self.total_latency_ms.store(0, Ordering::Relaxed);

        if let Ok(mut counts) = self.pair_counts.write() {
            counts.clear();
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
