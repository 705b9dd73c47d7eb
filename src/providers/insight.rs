//! Insight Generator
//!
//! Turns an `AnalysisSummary` into a short narrative. The remote generator
//! talks to any OpenAI-compatible chat-completions endpoint; the rule-based
//! one runs locally. Neither ever fails: remote errors collapse into
//! `INSIGHT_UNAVAILABLE`.

use eyre::{eyre, Result};
use futures_util::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::confidence::ConfidenceScore;
use crate::models::config::InsightConfig;
use crate::models::types::AnalysisSummary;
use crate::utils::constants::INSIGHT_UNAVAILABLE;
use crate::utils::labels::short_id;

/// Pairs included in a prompt
const PROMPT_MAX_PAIRS: usize = 10;

pub trait InsightGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        entities: &'a [String],
        summary: &'a AnalysisSummary,
    ) -> BoxFuture<'a, String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Prompt text describing the analysis for a language model
pub fn build_prompt(entities: &[String], summary: &AnalysisSummary) -> String {
    let mut prompt = format!(
        "Analyze the on-chain relationship between these Solana wallets: {}.\n\
         Confidence score: {}/100. Transactions scanned: {}. Unique counterparties: {}.\n",
        entities.join(", "),
        summary.confidence_score,
        summary.total_transactions_scanned,
        summary.unique_counterparty_count
    );

    if summary.pairs.is_empty() {
        prompt.push_str("No connections were found.\n");
    } else {
        prompt.push_str("Strongest evidence:\n");
        for pair in summary.pairs.iter().take(PROMPT_MAX_PAIRS) {
            prompt.push_str(&format!(
                "- {} and {}: {} [{}, score {}]\n",
                pair.entity_a,
                pair.entity_b,
                pair.reason,
                pair.category.as_str(),
                pair.score
            ));
        }
    }

    prompt.push_str("Summarize in 3-4 sentences whether these wallets are likely controlled by the same party.");
    prompt
}

/// OpenAI-compatible remote generator
pub struct HttpInsightGenerator {
    config: InsightConfig,
    client: reqwest::Client,
}

impl HttpInsightGenerator {
    pub fn new(config: InsightConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;
        Ok(Self { config, client })
    }

    async fn request(&self, prompt: String) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| eyre!("Insight API key not configured"))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| eyre!("Invalid API key header: {}", e))?,
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a blockchain forensics analyst.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| eyre!("Insight request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("Insight HTTP error: {}", response.status()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse insight response: {}", e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| eyre!("Insight response had no choices"))
    }
}

impl InsightGenerator for HttpInsightGenerator {
    fn generate<'a>(
        &'a self,
        entities: &'a [String],
        summary: &'a AnalysisSummary,
    ) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let prompt = build_prompt(entities, summary);
            debug!("🤖 Requesting insight ({} chars prompt)", prompt.len());
            match self.request(prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("⚠️ Insight unavailable: {}", e);
                    INSIGHT_UNAVAILABLE.to_string()
                }
            }
        })
    }
}

/// Deterministic local narrative
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedInsight;

impl RuleBasedInsight {
    pub fn narrate(entities: &[String], summary: &AnalysisSummary) -> String {
        let verdict = ConfidenceScore::calculate(&summary.pairs).verdict();

        let Some(top) = summary.pairs.first() else {
            return format!(
                "No on-chain connection found between {} wallets after scanning {} transactions.",
                entities.len(),
                summary.total_transactions_scanned
            );
        };

        format!(
            "{} connection ({}/100) across {} wallets. Strongest link: {} and {} ({}). {} related pair(s) found over {} transactions.",
            verdict,
            summary.confidence_score,
            entities.len(),
            short_id(&top.entity_a),
            short_id(&top.entity_b),
            top.reason,
            summary.pairs.len(),
            summary.total_transactions_scanned
        )
    }
}

impl InsightGenerator for RuleBasedInsight {
    fn generate<'a>(
        &'a self,
        entities: &'a [String],
        summary: &'a AnalysisSummary,
    ) -> BoxFuture<'a, String> {
        Box::pin(async move { Self::narrate(entities, summary) })
    }
}

/// Remote generator when a key is configured, otherwise the local one
pub fn insight_from_config(config: InsightConfig) -> Box<dyn InsightGenerator> {
    if config.is_enabled() {
        match HttpInsightGenerator::new(config) {
            Ok(generator) => return Box::new(generator),
            Err(e) => warn!("⚠️ Falling back to rule-based insight: {}", e),
        }
    }
    Box::new(RuleBasedInsight)
}
