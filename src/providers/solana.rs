//! Solana Chain Data Provider
//!
//! Fetches the recent transaction history of an address over standard
//! Solana JSON-RPC and flattens each transaction into a `TransactionRecord`:
//! 1. `getSignaturesForAddress` - newest signatures, up to the requested depth
//! 2. `getTransaction` (jsonParsed) - one call per signature, bounded concurrency
//!
//! Providers never fail towards the engine: any error is logged and turns
//! into an empty history.

use eyre::{eyre, Result};
use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::config::ProviderConfig;
use crate::models::types::TransactionRecord;
use crate::utils::cache::TransactionCache;
use crate::utils::constants::{
    RETRY_BASE_MS, RETRY_JITTER_PERCENT, RETRY_MAX_ATTEMPTS, RETRY_MAX_MS,
    USER_AGENT as USER_AGENT_CONST,
};

/// Source of per-address transaction history
pub trait ChainDataProvider: Send + Sync {
    /// Up to `limit` most recent records for `address`; empty on any failure
    fn fetch_transactions<'a>(
        &'a self,
        address: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Vec<TransactionRecord>>;
}

// ============================================
// SOLANA RPC TYPES
// ============================================

/// Entry returned by getSignaturesForAddress
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: Option<serde_json::Value>,
}

/// jsonParsed transaction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    pub slot: u64,
    pub block_time: Option<i64>,
    pub transaction: ParsedTransactionData,
    pub meta: Option<ParsedMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedTransactionData {
    pub signatures: Vec<String>,
    pub message: ParsedMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMessage {
    pub account_keys: Vec<ParsedAccountKey>,
    #[serde(default)]
    pub instructions: Vec<ParsedInstruction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAccountKey {
    pub pubkey: String,
    #[serde(default)]
    pub signer: bool,
    #[serde(default)]
    pub writable: bool,
}

/// Parsed or raw instruction; only the program and transfer destination matter here
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    pub program_id: String,
    #[serde(default)]
    pub parsed: Option<serde_json::Value>,
}

impl ParsedInstruction {
    /// `info.destination` of system/token transfers
    pub fn destination(&self) -> Option<&str> {
        self.parsed
            .as_ref()?
            .get("info")?
            .get("destination")?
            .as_str()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMeta {
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub inner_instructions: Option<Vec<InnerInstructions>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InnerInstructions {
    pub index: u8,
    pub instructions: Vec<ParsedInstruction>,
}

impl ParsedTransaction {
    /// Flatten into a record. The fee payer is the sender; recipients are
    /// transfer destinations plus accounts whose lamport balance grew.
    pub fn to_record(&self, fallback_signature: &str) -> TransactionRecord {
        let signature = self
            .transaction
            .signatures
            .first()
            .cloned()
            .unwrap_or_else(|| fallback_signature.to_string());
        let block_time = self.block_time.unwrap_or(0);
        let keys = &self.transaction.message.account_keys;

        let mut record = match keys.first() {
            Some(fee_payer) => TransactionRecord::new(signature, fee_payer.pubkey.clone(), block_time),
            None => TransactionRecord {
                signature,
                block_time,
                sender: None,
                recipients: Vec::new(),
                program_ids: Vec::new(),
            },
        };

        let inner = self
            .meta
            .as_ref()
            .and_then(|m| m.inner_instructions.as_ref())
            .into_iter()
            .flatten()
            .flat_map(|group| group.instructions.iter());

        for ix in self.transaction.message.instructions.iter().chain(inner) {
            if let Some(dest) = ix.destination() {
                record = record.to(dest);
            }
        }

        if let Some(meta) = &self.meta {
            for (i, key) in keys.iter().enumerate() {
                let pre = meta.pre_balances.get(i).copied().unwrap_or(0);
                let post = meta.post_balances.get(i).copied().unwrap_or(0);
                if post > pre {
                    record = record.to(key.pubkey.clone());
                }
            }
        }

        for ix in &self.transaction.message.instructions {
            record = record.via(ix.program_id.clone());
        }

        record
    }
}

// ============================================
// SOLANA RPC CLIENT
// ============================================

/// Solana JSON-RPC client with retry and a short-lived history cache
pub struct SolanaClient {
    config: ProviderConfig,
    client: reqwest::Client,
    cache: TransactionCache,
}

impl SolanaClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.rpc_timeout)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        let cache = TransactionCache::with_ttl(config.cache_ttl_secs);

        Ok(Self {
            config,
            client,
            cache,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ProviderConfig::from_env())
    }

    /// RPC URL with any path-embedded API key hidden
    pub fn masked_url(&self) -> String {
        match self.config.rpc_url.split_once("/v2/") {
            Some((base, _)) => format!("{}/v2/***", base),
            None => self.config.rpc_url.clone(),
        }
    }

    pub fn cache(&self) -> &TransactionCache {
        &self.cache
    }

    /// Execute JSON-RPC call with exponential backoff (500ms→1s→2s→... capped, with jitter)
    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let mut last_error = None;

        for attempt in 0..RETRY_MAX_ATTEMPTS {
            if attempt > 0 {
                let base_delay = (RETRY_BASE_MS * 2_u64.pow(attempt - 1)).min(RETRY_MAX_MS);
                let jitter_range = (base_delay * RETRY_JITTER_PERCENT) / 100;
                let jitter: i64 =
                    rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
                let delay = (base_delay as i64 + jitter).max(100) as u64;

                debug!("⏳ {} retry {}/{} after {}ms", method, attempt + 1, RETRY_MAX_ATTEMPTS, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.execute_call::<T>(&payload).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if e.to_string().contains("429") {
                        warn!("⏳ Rate limited on {} (attempt {}/{})", method, attempt + 1, RETRY_MAX_ATTEMPTS);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| eyre!("{} failed after {} attempts", method, RETRY_MAX_ATTEMPTS)))
    }

    async fn execute_call<T: for<'de> Deserialize<'de>>(&self, payload: &serde_json::Value) -> Result<T> {
        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| eyre!("Request failed: {}", e))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(eyre!("Rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(eyre!("HTTP error: {}", status));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse response: {}", e))?;

        if let Some(error) = json.get("error") {
            return Err(eyre!("RPC error: {}", error));
        }

        let result = json.get("result").ok_or_else(|| eyre!("No result in response"))?;

        serde_json::from_value(result.clone()).map_err(|e| eyre!("Failed to deserialize result: {}", e))
    }

    /// Most recent signatures first
    pub async fn get_signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<SignatureInfo>> {
        let params = serde_json::json!([address, { "limit": limit }]);
        self.call("getSignaturesForAddress", params).await
    }

    pub async fn get_transaction(&self, signature: &str) -> Result<Option<ParsedTransaction>> {
        let params = serde_json::json!([
            signature,
            {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}
        ]);
        self.call("getTransaction", params).await
    }

    /// Signatures then transactions, newest first. Individual transaction
    /// failures are dropped; a signature-list failure is an error.
    pub async fn fetch_records(&self, address: &str, limit: usize) -> Result<Vec<TransactionRecord>> {
        let signatures = self.get_signatures_for_address(address, limit).await?;
        debug!("📜 {} signatures for {}", signatures.len(), address);

        let concurrency = self.config.fetch_concurrency.max(1);
        let records: Vec<TransactionRecord> = stream::iter(signatures.into_iter().take(limit))
            .map(|info| async move {
                match self.get_transaction(&info.signature).await {
                    Ok(Some(tx)) => Some(tx.to_record(&info.signature)),
                    Ok(None) => None,
                    Err(e) => {
                        debug!("⚠️ getTransaction {} failed: {}", info.signature, e);
                        None
                    }
                }
            })
            .buffered(concurrency)
            .filter_map(|r| async move { r })
            .collect()
            .await;

        Ok(records)
    }
}

impl ChainDataProvider for SolanaClient {
    fn fetch_transactions<'a>(
        &'a self,
        address: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Vec<TransactionRecord>> {
        Box::pin(async move {
            let cache_key = format!("{}:{}", address, limit);
            if let Some(records) = self.cache.get(&cache_key) {
                return records;
            }

            match self.fetch_records(address, limit).await {
                Ok(records) => {
                    info!("📥 Fetched {} transactions for {}", records.len(), address);
                    self.cache.set(&cache_key, records.clone());
                    records
                }
                Err(e) => {
                    warn!("⚠️ Fetch failed for {}: {}", address, e);
                    Vec::new()
                }
            }
        })
    }
}

/// In-memory provider for offline analysis and tests
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    histories: HashMap<String, Vec<TransactionRecord>>,
}

impl StaticProvider {
    pub fn new(histories: HashMap<String, Vec<TransactionRecord>>) -> Self {
        Self { histories }
    }

    pub fn with(mut self, address: impl Into<String>, records: Vec<TransactionRecord>) -> Self {
        self.histories.insert(address.into(), records);
        self
    }
}

impl ChainDataProvider for StaticProvider {
    fn fetch_transactions<'a>(
        &'a self,
        address: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Vec<TransactionRecord>> {
        Box::pin(async move {
            self.histories
                .get(address)
                .map(|records| records.iter().take(limit).cloned().collect())
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TX: &str = r#"{
        "slot": 250000000,
        "blockTime": 1700000000,
        "transaction": {
            "signatures": ["5sig"],
            "message": {
                "accountKeys": [
                    {"pubkey": "Payer", "signer": true, "writable": true},
                    {"pubkey": "Dest", "signer": false, "writable": true},
                    {"pubkey": "Other", "signer": false, "writable": true},
                    {"pubkey": "11111111111111111111111111111111", "signer": false, "writable": false}
                ],
                "instructions": [
                    {
                        "programId": "11111111111111111111111111111111",
                        "parsed": {"type": "transfer", "info": {"source": "Payer", "destination": "Dest", "lamports": 1000}}
                    },
                    {"programId": "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4", "accounts": [], "data": "x"}
                ]
            }
        },
        "meta": {
            "err": null,
            "preBalances": [5000, 0, 10, 1],
            "postBalances": [3000, 1000, 20, 1],
            "innerInstructions": [
                {"index": 1, "instructions": [
                    {"programId": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                     "parsed": {"type": "transfer", "info": {"destination": "TokenDest"}}}
                ]}
            ]
        }
    }"#;

    #[test]
    fn test_parsed_transaction_to_record() {
        let tx: ParsedTransaction = serde_json::from_str(SAMPLE_TX).unwrap();
        let record = tx.to_record("fallback");

        assert_eq!(record.signature, "5sig");
        assert_eq!(record.block_time, 1_700_000_000);
        assert_eq!(record.sender.as_deref(), Some("Payer"));
        assert_eq!(record.recipients, vec!["Dest", "TokenDest", "Other"]);
        assert_eq!(
            record.program_ids,
            vec![
                "11111111111111111111111111111111",
                "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"
            ]
        );
    }

    #[test]
    fn test_missing_block_time_defaults_to_zero() {
        let json = r#"{"slot": 1, "transaction": {"signatures": [], "message": {"accountKeys": []}}, "meta": null}"#;
        let tx: ParsedTransaction = serde_json::from_str(json).unwrap();
        let record = tx.to_record("fallback");
        assert_eq!(record.block_time, 0);
        assert_eq!(record.signature, "fallback");
        assert!(record.is_malformed());
    }

    #[tokio::test]
    async fn test_static_provider_truncates_and_defaults_empty() {
        let provider = StaticProvider::default().with(
            "A",
            vec![
                TransactionRecord::new("s1", "A", 1),
                TransactionRecord::new("s2", "A", 2),
            ],
        );
        assert_eq!(provider.fetch_transactions("A", 1).await.len(), 1);
        assert!(provider.fetch_transactions("missing", 10).await.is_empty());
    }

    #[test]
    fn test_masked_url_hides_key() {
        let config = ProviderConfig {
            rpc_url: "https://solana-mainnet.g.alchemy.com/v2/secret".to_string(),
            ..ProviderConfig::default()
        };
        let client = SolanaClient::new(config).unwrap();
        assert!(!client.masked_url().contains("secret"));
    }
}
