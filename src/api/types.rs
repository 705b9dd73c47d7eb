//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::config::AnalysisConfig;
use crate::models::errors::AppError;
use crate::models::types::{AnalysisSummary, EntityActivity, Graph, PairEvidence};
use crate::utils::cache::CacheStats;
use crate::utils::constants::{MAX_MONITORED_ENTITIES, MIN_MONITORED_ENTITIES};

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message,
            details: None,
        }
    }
}

// ============================================
// Analysis
// ============================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub addresses: Vec<String>,
    pub max_transactions: Option<usize>,
    pub time_window_seconds: Option<u64>,
    pub include_programs: Option<bool>,
    #[serde(default)]
    pub with_insight: bool,
}

impl AnalyzeRequest {
    /// Overrides on top of the server's base config
    pub fn config(&self, base: &AnalysisConfig) -> AnalysisConfig {
        let mut config = base.clone();
        if let Some(n) = self.max_transactions {
            config = config.with_max_transactions(n);
        }
        if let Some(secs) = self.time_window_seconds {
            config = config.with_time_window(secs);
        }
        if let Some(include) = self.include_programs {
            config = config.with_programs(include);
        }
        config.normalized()
    }
}

/// Trimmed, deduplicated addresses; 2 to 5 distinct non-empty entries
pub fn validate_addresses(addresses: &[String]) -> Result<Vec<String>, ApiError> {
    let mut distinct: Vec<String> = Vec::with_capacity(addresses.len());
    for address in addresses {
        let address = address.trim();
        if address.is_empty() {
            return Err(ApiError::bad_request("Addresses must be non-empty"));
        }
        if !distinct.iter().any(|a| a == address) {
            distinct.push(address.to_string());
        }
    }

    if distinct.len() < MIN_MONITORED_ENTITIES || distinct.len() > MAX_MONITORED_ENTITIES {
        return Err(ApiError::bad_request(format!(
            "Provide between {} and {} distinct addresses (got {})",
            MIN_MONITORED_ENTITIES,
            MAX_MONITORED_ENTITIES,
            distinct.len()
        )));
    }

    Ok(distinct)
}

#[derive(Debug, Deserialize)]
pub struct OfflineAnalyzeRequest {
    pub entities: Vec<EntityActivity>,
    #[serde(default)]
    pub config: Option<AnalysisConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisData {
    pub analysis_id: String,
    pub graph: Graph,
    pub summary: AnalysisSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportCsvRequest {
    pub pairs: Vec<PairEvidence>,
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsData {
    pub total_analyses: u64,
    pub failed_analyses: u64,
    pub transactions_scanned: u64,
    pub pairs_found: u64,
    pub avg_latency_ms: f64,
    pub cache_entries: usize,
    pub cache_hit_rate: f64,
    pub uptime_seconds: u64,
    pub api_version: String,
}

impl StatsData {
    pub fn with_cache(mut self, cache: &CacheStats) -> Self {
        self.cache_entries = cache.entries;
        self.cache_hit_rate = cache.hit_rate;
        self
    }
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
