//! API Request Handlers

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::middleware::api_keys_from_env;
use super::types::*;
use crate::core::service::AnalysisService;
use crate::models::config::{AnalysisConfig, InsightConfig, ProviderConfig};
use crate::models::errors::AppError;
use crate::models::types::AnalysisReport;
use crate::providers::insight::{insight_from_config, InsightGenerator};
use crate::providers::solana::{ChainDataProvider, SolanaClient};
use crate::utils::cache::TransactionCache;
use crate::utils::export::pairs_to_csv;
use crate::utils::telemetry::TelemetryCollector;

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub service: AnalysisService,
    pub telemetry: Arc<TelemetryCollector>,
    pub insight: Arc<dyn InsightGenerator>,
    pub cache: TransactionCache,
    pub base_config: AnalysisConfig,
    pub api_keys: HashSet<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn ChainDataProvider>,
        cache: TransactionCache,
        insight: Arc<dyn InsightGenerator>,
        base_config: AnalysisConfig,
    ) -> Self {
        let telemetry = Arc::new(TelemetryCollector::new());
        Self {
            service: AnalysisService::new(provider, telemetry.clone()),
            telemetry,
            insight,
            cache,
            base_config,
            api_keys: HashSet::new(),
            start_time: Instant::now(),
        }
    }

    /// Require one of `keys` on every non-health request
    pub fn with_api_keys(mut self, keys: HashSet<String>) -> Self {
        self.api_keys = keys;
        self
    }

    /// Solana RPC provider and insight generator from environment
    pub fn from_env() -> eyre::Result<Self> {
        let client = SolanaClient::new(ProviderConfig::from_env())?;
        info!("🔗 RPC endpoint: {}", client.masked_url());
        let cache = client.cache().clone();
        let insight: Arc<dyn InsightGenerator> = Arc::from(insight_from_config(InsightConfig::from_env()));

        let api_keys = api_keys_from_env();
        if !api_keys.is_empty() {
            info!("🔑 API key allow-list: {} keys", api_keys.len());
        }

        Ok(Self::new(Arc::new(client), cache, insight, AnalysisConfig::from_env())
            .with_api_keys(api_keys))
    }

    /// Background task: drop expired history entries every 60 seconds
    pub fn spawn_cache_cleanup(&self) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                cache.cleanup_expired();
            }
        });
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn bad_request(error: ApiError, start: Instant) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(error, elapsed_ms(start))),
    )
}

fn app_error(err: AppError, start: Instant) -> ErrorResponse {
    let status = StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warn!("❌ [{}] {}", err.code_str(), err.message);
    (status, Json(ApiResponse::error(err.into(), elapsed_ms(start))))
}

fn analysis_data(report: AnalysisReport, insight: Option<String>) -> AnalysisData {
    AnalysisData {
        analysis_id: uuid::Uuid::new_v4().to_string(),
        graph: report.graph,
        summary: report.summary,
        insight,
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Connection Analysis
// ============================================

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisData>>, ErrorResponse> {
    let start = Instant::now();

    let addresses = validate_addresses(&req.addresses).map_err(|e| bad_request(e, start))?;
    let config = req.config(&state.base_config);

    let report = state
        .service
        .analyze(&addresses, config)
        .await
        .map_err(|e| app_error(e, start))?;

    let insight = if req.with_insight {
        Some(state.insight.generate(&addresses, &report.summary).await)
    } else {
        None
    };

    info!(
        "✅ /v1/analyze: {} addresses, {} pairs, confidence {}",
        addresses.len(),
        report.summary.pairs.len(),
        report.summary.confidence_score
    );

    Ok(Json(ApiResponse::success(
        analysis_data(report, insight),
        elapsed_ms(start),
    )))
}

/// Analysis over caller-supplied records; no RPC
pub async fn analyze_offline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OfflineAnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisData>>, ErrorResponse> {
    let start = Instant::now();

    let addresses: Vec<String> = req.entities.iter().map(|e| e.address.clone()).collect();
    validate_addresses(&addresses).map_err(|e| bad_request(e, start))?;

    let config = req.config.unwrap_or_else(|| state.base_config.clone());
    let report = state.service.analyze_offline(&req.entities, config);

    Ok(Json(ApiResponse::success(
        analysis_data(report, None),
        elapsed_ms(start),
    )))
}

pub async fn export_csv(
    Json(req): Json<ExportCsvRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let start = Instant::now();
    let body = pairs_to_csv(&req.pairs).map_err(|e| app_error(e, start))?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();
    let cache_stats = state.cache.stats();

    let data = StatsData {
        total_analyses: stats.total_analyses,
        failed_analyses: stats.failed_analyses,
        transactions_scanned: stats.transactions_scanned,
        pairs_found: stats.pairs_found,
        avg_latency_ms: stats.avg_latency_ms,
        cache_entries: 0,
        cache_hit_rate: 0.0,
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    }
    .with_cache(&cache_stats);

    info!(
        "📊 Cache Stats: {} entries, {:.1}% hit rate ({} hits / {} misses)",
        cache_stats.entries, cache_stats.hit_rate, cache_stats.hits, cache_stats.misses
    );

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
