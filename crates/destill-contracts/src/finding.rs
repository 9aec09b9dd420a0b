use serde::{Deserialize, Serialize};

/// Severity assigned by the analyzer's regex classification (§4.4 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

/// Why pre/post context was clipped, if at all (§4.4 step 8), or why a
/// finding has none of the usual line-scoped context at all (JUnit findings
/// are derived from structured test-report data, not a log chunk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextNote {
    #[serde(rename = "")]
    None,
    #[serde(rename = "truncated at chunk start")]
    TruncatedAtChunkStart,
    #[serde(rename = "truncated at chunk end")]
    TruncatedAtChunkEnd,
    #[serde(rename = "truncated at chunk boundaries")]
    TruncatedAtChunkBoundaries,
    #[serde(rename = "JUnit test failure (structured data)")]
    JunitStructuredFailure,
}

impl ContextNote {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextNote::None => "",
            ContextNote::TruncatedAtChunkStart => "truncated at chunk start",
            ContextNote::TruncatedAtChunkEnd => "truncated at chunk end",
            ContextNote::TruncatedAtChunkBoundaries => "truncated at chunk boundaries",
            ContextNote::JunitStructuredFailure => "JUnit test failure (structured data)",
        }
    }

    pub fn from_clipping(pre_clipped: bool, post_clipped: bool) -> Self {
        match (pre_clipped, post_clipped) {
            (true, true) => ContextNote::TruncatedAtChunkBoundaries,
            (true, false) => ContextNote::TruncatedAtChunkStart,
            (false, true) => ContextNote::TruncatedAtChunkEnd,
            (false, false) => ContextNote::None,
        }
    }
}

/// A candidate failure on a single log line, emitted per-chunk by the
/// analyzer (§3, §4.4). Stateless and chunk-local: all context lives inside
/// the chunk that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// 1-based, global to the job (not the chunk).
    pub line_number: u64,
    pub raw_message: String,
    pub normalized_message: String,
    pub severity: Severity,
    pub confidence_score: f64,
    pub pre_context: Vec<String>,
    pub post_context: Vec<String>,
    pub context_note: ContextNote,
}
