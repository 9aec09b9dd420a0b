use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::finding::{ContextNote, Finding, Severity};
use crate::ids::{message_hash, short_hash};
use crate::metadata::MetadataMap;

/// The externalized finding shipped on `destill.analysis.findings` (§3). A
/// superset of [`Finding`] enriched with identity, source, and build
/// context. This is the only TriageCard shape this codebase produces — the
/// source system's "legacy"/"V2" duplication (§9) is not reproduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageCard {
    pub id: String,
    pub request_id: String,
    pub message_hash: String,
    /// Origin identifier: `buildkite`, `junit:<path>`, ...
    pub source: String,
    pub job_name: String,
    /// The job this card's line number is relative to. Not in the
    /// distilled field list but required to reproduce the `TriageCard.id`
    /// format named in §4.6; see DESIGN.md.
    pub job_id: String,
    pub build_url: String,
    pub chunk_index: usize,
    pub line_in_chunk: u64,
    pub metadata: MetadataMap,
    pub timestamp: DateTime<Utc>,

    pub line_number: u64,
    pub raw_message: String,
    pub normalized_message: String,
    pub severity: Severity,
    pub confidence_score: f64,
    pub pre_context: Vec<String>,
    pub post_context: Vec<String>,
    pub context_note: ContextNote,
}

/// Everything needed to place a [`Finding`] on the wire as a [`TriageCard`],
/// beyond what the finding itself carries.
pub struct TriageCardContext<'a> {
    pub request_id: &'a str,
    pub job_id: &'a str,
    pub job_name: &'a str,
    pub build_url: &'a str,
    pub source: &'a str,
    pub chunk_index: usize,
    pub metadata: MetadataMap,
    pub timestamp: DateTime<Utc>,
}

impl TriageCard {
    /// Build a card from an analyzer [`Finding`] and its surrounding
    /// context (§4.6). `line_in_chunk` is derived from the finding's global
    /// line number and the chunk's starting line.
    pub fn from_finding(finding: &Finding, chunk_line_start: u64, ctx: TriageCardContext<'_>) -> Self {
        let hash = message_hash(&finding.normalized_message);
        let id = format!(
            "{}-{}-{}-{}",
            ctx.request_id,
            ctx.job_id,
            &hash[..8],
            finding.line_number
        );
        let line_in_chunk = finding.line_number.saturating_sub(chunk_line_start) + 1;

        TriageCard {
            id,
            request_id: ctx.request_id.to_string(),
            message_hash: hash,
            source: ctx.source.to_string(),
            job_name: ctx.job_name.to_string(),
            job_id: ctx.job_id.to_string(),
            build_url: ctx.build_url.to_string(),
            chunk_index: ctx.chunk_index,
            line_in_chunk,
            metadata: ctx.metadata,
            timestamp: ctx.timestamp,
            line_number: finding.line_number,
            raw_message: finding.raw_message.clone(),
            normalized_message: finding.normalized_message.clone(),
            severity: finding.severity,
            confidence_score: finding.confidence_score,
            pre_context: finding.pre_context.clone(),
            post_context: finding.post_context.clone(),
            context_note: finding.context_note,
        }
    }

    /// The `"{job_id}-{first-8-of-hash}-{line_number}"` local id §4.6 names
    /// for the analyzer agent, before the `request_id` prefix is attached.
    pub fn local_id(job_id: &str, normalized_message: &str, line_number: u64) -> String {
        format!("{job_id}-{}-{line_number}", short_hash(normalized_message))
    }
}
