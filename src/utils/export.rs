//! Pair Evidence Export
//!
//! JSON (verbatim) and CSV (`EntityA,EntityB,Type,Reason,Score`) renderings
//! of the ranked pairs, plus a CSV reader for re-importing exports.

use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{AnalysisReport, EntityActivity, LinkCategory, PairEvidence, TransactionRecord};

pub const CSV_HEADER: &str = "EntityA,EntityB,Type,Reason,Score";

/// One parsed CSV row
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PairRow {
    #[serde(rename = "EntityA")]
    pub entity_a: String,
    #[serde(rename = "EntityB")]
    pub entity_b: String,
    #[serde(rename = "Type")]
    pub category: String,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Score")]
    pub score: u32,
}

impl PairRow {
    /// Back to evidence; `None` for an unknown type string
    pub fn into_evidence(self) -> Option<PairEvidence> {
        let category = LinkCategory::parse(&self.category)?;
        Some(PairEvidence {
            entity_a: self.entity_a,
            entity_b: self.entity_b,
            reason: self.reason,
            score: self.score,
            category,
        })
    }
}

pub fn pairs_to_json(pairs: &[PairEvidence]) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(pairs)?)
}

/// Header line, then one fully quoted record per pair with embedded quotes
/// doubled. Entity ids are opaque and may carry commas or quotes.
pub fn pairs_to_csv(pairs: &[PairEvidence]) -> AppResult<String> {
    let mut buf = Vec::with_capacity(CSV_HEADER.len() + pairs.len() * 128);
    buf.extend_from_slice(CSV_HEADER.as_bytes());
    buf.push(b'\n');

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf);

    for pair in pairs {
        let score = pair.score.to_string();
        writer.write_record([
            pair.entity_a.as_str(),
            pair.entity_b.as_str(),
            pair.category.as_str(),
            pair.reason.as_str(),
            score.as_str(),
        ])?;
    }

    let buf = writer
        .into_inner()
        .map_err(|e| AppError::with_source(ErrorCode::ExportFailed, "CSV flush failed", e.into_error()))?;
    String::from_utf8(buf)
        .map_err(|e| AppError::with_source(ErrorCode::ExportFailed, "CSV output is not UTF-8", e))
}

pub fn pairs_from_csv(text: &str) -> AppResult<Vec<PairRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: PairRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// Parses `{ "<address>": [TransactionRecord...] }`. With `addresses`
/// given, activities follow that order and missing keys become empty
/// histories; otherwise file key order is used.
pub fn activities_from_json(text: &str, addresses: &[String]) -> AppResult<Vec<EntityActivity>> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;

    let order: Vec<String> = if addresses.is_empty() {
        map.keys().cloned().collect()
    } else {
        addresses.to_vec()
    };

    let mut activities = Vec::with_capacity(order.len());
    for address in order {
        let transactions: Vec<TransactionRecord> = match map.get(&address) {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        activities.push(EntityActivity::new(address, transactions));
    }
    Ok(activities)
}

/// Writes `connections_<ts>.json` (full report) and `connections_<ts>.csv`
/// (pairs) into `dir`, creating it if needed.
pub fn write_report(dir: &Path, report: &AnalysisReport) -> AppResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::with_source(ErrorCode::ExportFailed, "Cannot create export dir", e))?;

    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let json_path = dir.join(format!("connections_{}.json", stamp));
    let csv_path = dir.join(format!("connections_{}.csv", stamp));

    fs::write(&json_path, serde_json::to_string_pretty(report)?)?;
    fs::write(&csv_path, pairs_to_csv(&report.summary.pairs)?)?;

    info!("💾 Exported {} and {}", json_path.display(), csv_path.display());
    Ok((json_path, csv_path))
}
