//! Analysis Service
//!
//! Async orchestration around the synchronous engine: fetch each monitored
//! address's history one after another, then analyze. The only failure is
//! "no data at all".

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::engine::ConnectionAnalyzer;
use crate::models::config::AnalysisConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{AnalysisReport, EntityActivity};
use crate::providers::solana::ChainDataProvider;
use crate::utils::telemetry::TelemetryCollector;

pub struct AnalysisService {
    provider: Arc<dyn ChainDataProvider>,
    telemetry: Arc<TelemetryCollector>,
}

impl AnalysisService {
    pub fn new(provider: Arc<dyn ChainDataProvider>, telemetry: Arc<TelemetryCollector>) -> Self {
        Self {
            provider,
            telemetry,
        }
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    /// Fetch histories in address order
    pub async fn collect(&self, addresses: &[String], limit: usize) -> Vec<EntityActivity> {
        let mut activities = Vec::with_capacity(addresses.len());
        for address in addresses {
            let transactions = self.provider.fetch_transactions(address, limit).await;
            if transactions.is_empty() {
                warn!("📭 No transactions for {}", address);
            }
            activities.push(EntityActivity::new(address.clone(), transactions));
        }
        activities
    }

    /// Fetch then analyze. Errors with `ANALYSIS_NO_DATA` when every
    /// history came back empty.
    pub async fn analyze(&self, addresses: &[String], config: AnalysisConfig) -> AppResult<AnalysisReport> {
        let start = Instant::now();
        let config = config.normalized();

        info!(
            "🚀 Analysis started: {} addresses, depth {}, window {}s",
            addresses.len(),
            config.max_transactions,
            config.time_window_seconds
        );

        let activities = self.collect(addresses, config.max_transactions).await;

        if activities.iter().all(|a| a.transactions.is_empty()) {
            self.telemetry
                .record_failure(start.elapsed().as_millis() as u64);
            return Err(AppError::no_data());
        }

        Ok(self.analyze_activities(&activities, config, start))
    }

    /// Analyze caller-supplied histories; never fails
    pub fn analyze_offline(&self, activities: &[EntityActivity], config: AnalysisConfig) -> AnalysisReport {
        self.analyze_activities(activities, config.normalized(), Instant::now())
    }

    fn analyze_activities(
        &self,
        activities: &[EntityActivity],
        config: AnalysisConfig,
        start: Instant,
    ) -> AnalysisReport {
        let report = ConnectionAnalyzer::new(config).analyze(activities);
        self.telemetry
            .record_analysis(&report.summary, start.elapsed().as_millis() as u64);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use crate::models::types::TransactionRecord;
    use crate::providers::solana::StaticProvider;

    fn service(provider: StaticProvider) -> AnalysisService {
        AnalysisService::new(Arc::new(provider), Arc::new(TelemetryCollector::new()))
    }

    #[tokio::test]
    async fn test_no_data_is_error() {
        let svc = service(StaticProvider::default());
        let err = svc
            .analyze(&["A".to_string(), "B".to_string()], AnalysisConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AnalysisNoData);
        assert_eq!(svc.telemetry().get_stats().failed_analyses, 1);
    }

    #[tokio::test]
    async fn test_partial_data_still_analyzes() {
        let provider = StaticProvider::default().with("A", vec![TransactionRecord::new("s1", "A", 5).to("B")]);
        let svc = service(provider);

        let report = svc
            .analyze(&["A".to_string(), "B".to_string()], AnalysisConfig::default())
            .await
            .unwrap();

        assert_eq!(report.summary.confidence_score, 40);
        assert_eq!(report.graph.nodes.len(), 2);
        assert_eq!(svc.telemetry().get_stats().total_analyses, 1);
    }

    #[tokio::test]
    async fn test_fetch_depth_is_applied() {
        let txs = (0..10)
            .map(|i| TransactionRecord::new(format!("s{}", i), "A", i).to("X"))
            .collect();
        let svc = service(StaticProvider::default().with("A", txs));

        let report = svc
            .analyze(
                &["A".to_string(), "B".to_string()],
                AnalysisConfig::default().with_max_transactions(3),
            )
            .await
            .unwrap();

        assert_eq!(report.summary.total_transactions_scanned, 3);
    }
}
