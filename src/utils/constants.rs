//! Constants Module - Single Source of Truth
//!
//! Defaults, heuristic weights, environment keys and well-known program ids.
//! Other modules read these instead of hardcoding values.

// ============================================
// APPLICATION CONSTANTS
// ============================================

pub const APP_NAME: &str = "RusterGraph";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "RusterGraph/0.1.0";

// ============================================
// ANALYSIS DEFAULTS
// ============================================

pub const DEFAULT_MAX_TRANSACTIONS: usize = 100;
pub const MAX_TRANSACTIONS_CAP: usize = 1000;
pub const DEFAULT_TIME_WINDOW_SECS: u64 = 300;
pub const MIN_MONITORED_ENTITIES: usize = 2;
pub const MAX_MONITORED_ENTITIES: usize = 5;

// ============================================
// HEURISTIC WEIGHTS
// ============================================

pub const DIRECT_LINK_WEIGHT: f64 = 5.0;
pub const SHARED_LINK_WEIGHT: f64 = 0.5;
pub const TIME_PROXIMATE_LINK_WEIGHT: f64 = 2.0;
pub const MIDDLEMAN_LINK_WEIGHT: f64 = 3.0;

pub const DIRECT_PAIR_SCORE: u32 = 50;
pub const TIME_PROXIMATE_PAIR_SCORE: u32 = 30;
pub const MIDDLEMAN_PAIR_SCORE: u32 = 20;
pub const SHARED_COUNTERPARTY_PAIR_SCORE: u32 = 10;

/// A hub needs more than this many distinct monitored interactors...
pub const HUB_MIN_DISTINCT_EXCLUSIVE: usize = 2;
/// ...or more than this many interactions in total
pub const HUB_MIN_INTERACTIONS_EXCLUSIVE: usize = 5;

// ============================================
// PROVIDER CONSTANTS
// ============================================

pub const SOLANA_PUBLIC_RPC: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub const RETRY_BASE_MS: u64 = 500;
pub const RETRY_MAX_MS: u64 = 8000;
pub const RETRY_MAX_ATTEMPTS: u32 = 4;
pub const RETRY_JITTER_PERCENT: u64 = 20;

pub const INSIGHT_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const INSIGHT_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const INSIGHT_TIMEOUT_SECS: u64 = 30;
pub const INSIGHT_UNAVAILABLE: &str = "AI insight unavailable.";

// ============================================
// ENVIRONMENT KEYS
// ============================================

pub const ENV_MAX_TRANSACTIONS: &str = "RUSTER_MAX_TRANSACTIONS";
pub const ENV_TIME_WINDOW_SECS: &str = "RUSTER_TIME_WINDOW_SECS";
pub const ENV_INCLUDE_PROGRAMS: &str = "RUSTER_INCLUDE_PROGRAMS";
pub const ENV_IGNORED_PROGRAMS: &str = "RUSTER_IGNORED_PROGRAMS";
pub const ENV_SOLANA_RPC_URL: &str = "SOLANA_RPC_URL";
pub const ENV_ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
pub const ENV_INSIGHT_API_URL: &str = "INSIGHT_API_URL";
pub const ENV_INSIGHT_API_KEY: &str = "INSIGHT_API_KEY";
pub const ENV_INSIGHT_MODEL: &str = "INSIGHT_MODEL";
pub const ENV_PORT: &str = "PORT";
pub const ENV_RUSTER_PORT: &str = "RUSTER_PORT";
pub const ENV_HOST: &str = "RUSTER_HOST";
pub const ENV_API_KEYS: &str = "RUSTER_API_KEYS";
pub const ENV_RATE_LIMIT_PER_MINUTE: &str = "RUSTER_RATE_LIMIT_PER_MINUTE";

pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: u16 = 3000;

// ============================================
// WELL-KNOWN PROGRAMS
// ============================================

pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
pub const ASSOCIATED_TOKEN_PROGRAM: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";
pub const COMPUTE_BUDGET_PROGRAM: &str = "ComputeBudget111111111111111111111111111111";
pub const MEMO_PROGRAM: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";
pub const VOTE_PROGRAM: &str = "Vote111111111111111111111111111111111111111";

/// Infrastructure programs nearly every transaction touches; they say
/// nothing about a relationship and are skipped by default.
pub const DEFAULT_IGNORED_PROGRAMS: [&str; 7] = [
    SYSTEM_PROGRAM,
    TOKEN_PROGRAM,
    TOKEN_2022_PROGRAM,
    ASSOCIATED_TOKEN_PROGRAM,
    COMPUTE_BUDGET_PROGRAM,
    MEMO_PROGRAM,
    VOTE_PROGRAM,
];

/// Build an Alchemy Solana RPC URL from an API key
pub fn build_alchemy_solana_url(api_key: &str) -> String {
    format!("https://solana-mainnet.g.alchemy.com/v2/{}", api_key)
}

/// Parse an environment variable, falling back to `default` when absent or invalid
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_programs_unique() {
        let mut sorted = DEFAULT_IGNORED_PROGRAMS.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), DEFAULT_IGNORED_PROGRAMS.len());
    }

    #[test]
    fn test_env_parse_falls_back() {
        assert_eq!(env_parse("RUSTER_TEST_UNSET_KEY_FOR_ENV_PARSE", 42u64), 42);
    }

    #[test]
    fn test_alchemy_url() {
        assert!(build_alchemy_solana_url("k").ends_with("/v2/k"));
    }
}
