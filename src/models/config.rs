//! Configuration module for Ruster Graph
//!
//! Uses constants from utils/constants.rs; nothing here is hardcoded.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

use crate::utils::constants::{
    build_alchemy_solana_url, env_parse, DEFAULT_CACHE_TTL_SECS, DEFAULT_FETCH_CONCURRENCY,
    DEFAULT_IGNORED_PROGRAMS, DEFAULT_MAX_TRANSACTIONS, DEFAULT_RPC_TIMEOUT_SECS,
    DEFAULT_TIME_WINDOW_SECS, ENV_ALCHEMY_API_KEY, ENV_IGNORED_PROGRAMS, ENV_INCLUDE_PROGRAMS,
    ENV_INSIGHT_API_KEY, ENV_INSIGHT_API_URL, ENV_INSIGHT_MODEL, ENV_MAX_TRANSACTIONS,
    ENV_SOLANA_RPC_URL, ENV_TIME_WINDOW_SECS, INSIGHT_DEFAULT_MODEL, INSIGHT_DEFAULT_URL,
    INSIGHT_TIMEOUT_SECS, MAX_TRANSACTIONS_CAP, SOLANA_PUBLIC_RPC,
};

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Requested fetch depth per address (enforced by the provider, not the engine)
    pub max_transactions: usize,
    /// Max seconds between two interactions to count as time-proximate
    pub time_window_seconds: u64,
    /// Register invoked programs as graph nodes
    pub include_programs: bool,
    /// Program ids never registered, even with `include_programs`
    pub ignored_programs: HashSet<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_transactions: DEFAULT_MAX_TRANSACTIONS,
            time_window_seconds: DEFAULT_TIME_WINDOW_SECS,
            include_programs: true,
            ignored_programs: DEFAULT_IGNORED_PROGRAMS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by `RUSTER_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut ignored_programs = defaults.ignored_programs;
        if let Ok(extra) = std::env::var(ENV_IGNORED_PROGRAMS) {
            ignored_programs.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from),
            );
        }

        Self {
            max_transactions: env_parse(ENV_MAX_TRANSACTIONS, defaults.max_transactions),
            time_window_seconds: env_parse(ENV_TIME_WINDOW_SECS, defaults.time_window_seconds),
            include_programs: env_parse(ENV_INCLUDE_PROGRAMS, defaults.include_programs),
            ignored_programs,
        }
        .normalized()
    }

    pub fn with_max_transactions(mut self, max_transactions: usize) -> Self {
        self.max_transactions = max_transactions;
        self.normalized()
    }

    pub fn with_time_window(mut self, seconds: u64) -> Self {
        self.time_window_seconds = seconds;
        self
    }

    pub fn with_programs(mut self, include: bool) -> Self {
        self.include_programs = include;
        self
    }

    /// Clamp fetch depth into the supported range
    pub fn normalized(mut self) -> Self {
        self.max_transactions = self.max_transactions.clamp(1, MAX_TRANSACTIONS_CAP);
        self
    }

    #[inline]
    pub fn is_ignored_program(&self, program_id: &str) -> bool {
        self.ignored_programs.contains(program_id)
    }
}

/// Chain data provider settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub rpc_url: String,
    pub rpc_timeout: Duration,
    /// Parallel `getTransaction` calls per address
    pub fetch_concurrency: usize,
    pub cache_ttl_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: SOLANA_PUBLIC_RPC.to_string(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl ProviderConfig {
    /// `SOLANA_RPC_URL`, else Alchemy from `ALCHEMY_API_KEY`, else the public endpoint.
    /// The API key is never logged.
    pub fn from_env() -> Self {
        let rpc_url = std::env::var(ENV_SOLANA_RPC_URL)
            .ok()
            .filter(|u| !u.is_empty())
            .or_else(|| {
                std::env::var(ENV_ALCHEMY_API_KEY)
                    .ok()
                    .filter(|k| !k.is_empty() && k != "YOUR_API_KEY")
                    .map(|k| {
                        info!("🔑 ALCHEMY_API_KEY configured (key hidden for security)");
                        build_alchemy_solana_url(&k)
                    })
            })
            .unwrap_or_else(|| SOLANA_PUBLIC_RPC.to_string());

        Self {
            rpc_url,
            ..Self::default()
        }
    }
}

/// Insight generator settings. `api_key == None` disables the remote call.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_url: INSIGHT_DEFAULT_URL.to_string(),
            api_key: None,
            model: INSIGHT_DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(INSIGHT_TIMEOUT_SECS),
        }
    }
}

impl InsightConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var(ENV_INSIGHT_API_URL).unwrap_or(defaults.api_url),
            api_key: std::env::var(ENV_INSIGHT_API_KEY).ok().filter(|k| !k.is_empty()),
            model: std::env::var(ENV_INSIGHT_MODEL).unwrap_or(defaults.model),
            timeout: defaults.timeout,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::SYSTEM_PROGRAM;

    #[test]
    fn test_default_ignores_system_program() {
        let config = AnalysisConfig::default();
        assert!(config.is_ignored_program(SYSTEM_PROGRAM));
        assert!(!config.is_ignored_program("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"));
    }

    #[test]
    fn test_max_transactions_clamped() {
        assert_eq!(AnalysisConfig::default().with_max_transactions(0).max_transactions, 1);
        assert_eq!(
            AnalysisConfig::default().with_max_transactions(50_000).max_transactions,
            MAX_TRANSACTIONS_CAP
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"time_window_seconds": 60}"#).unwrap();
        assert_eq!(config.time_window_seconds, 60);
        assert_eq!(config.max_transactions, DEFAULT_MAX_TRANSACTIONS);
        assert!(config.include_programs);
    }

    #[test]
    fn test_insight_disabled_without_key() {
        assert!(!InsightConfig::default().is_enabled());
    }
}
