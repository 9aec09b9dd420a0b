//! Stateless per-chunk failure scanner (§3, §4.4).
//!
//! `analyze_chunk` never fails on its input: malformed UTF-8 is tolerated
//! upstream (the chunk content is already a `String`), and an empty chunk
//! simply yields no findings. All context a finding needs is drawn from
//! within its own chunk, which is what makes this function safe to run
//! concurrently across chunks.

pub mod confidence;
pub mod context;
pub mod normalize;
pub mod severity;

use destill_contracts::metadata::exit_state;
use destill_contracts::{ContextNote, Finding, LogChunk, Severity};

/// Lines shorter than this are skipped before severity detection (§4.4 step 3).
const MIN_LINE_LENGTH: usize = 10;

/// Scan one chunk and return its candidate findings. Findings are not
/// deduplicated here — the same `normalized_message` may legitimately recur
/// across chunks; the ranker collapses that.
pub fn analyze_chunk(chunk: &LogChunk) -> Vec<Finding> {
    let state = exit_state(&chunk.metadata);
    let lines: Vec<&str> = chunk.content.lines().collect();
    let mut findings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.len() < MIN_LINE_LENGTH {
            continue;
        }

        let severity = severity::detect_severity(trimmed);
        if !matches!(severity, Severity::Error | Severity::Fatal) {
            continue;
        }

        let base_score = confidence::score_line(trimmed, severity);
        let final_score = confidence::apply_job_state(base_score, state);
        if final_score < 0.5 {
            continue;
        }

        let normalized_message = normalize::normalize(trimmed);
        let (pre_context, post_context, context_note) = context::extract_context(
            &lines,
            idx,
            context::PRE_CONTEXT_LINES,
            context::POST_CONTEXT_LINES,
        );

        findings.push(Finding {
            line_number: chunk.line_start + idx as u64,
            raw_message: trimmed.to_string(),
            normalized_message,
            severity,
            confidence_score: final_score,
            pre_context,
            post_context,
            context_note,
        });
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use destill_contracts::MetadataBuilder;

    fn chunk_with(content: &str, exit_status: &str) -> LogChunk {
        LogChunk {
            request_id: "req-1".into(),
            build_id: "build-1".into(),
            job_name: "job".into(),
            job_id: "job-1".into(),
            chunk_index: 0,
            total_chunks: 1,
            content: content.to_string(),
            line_start: 1,
            line_end: content.lines().count().max(1) as u64,
            metadata: MetadataBuilder::new().exit_status(exit_status).build(),
        }
    }

    #[test]
    fn empty_content_yields_zero_findings() {
        let chunk = chunk_with("", "1");
        assert!(analyze_chunk(&chunk).is_empty());
    }

    #[test]
    fn info_and_warn_lines_never_produce_a_finding() {
        let chunk = chunk_with(
            "[INFO] server started normally today\n[WARN] disk usage approaching limit",
            "1",
        );
        assert!(analyze_chunk(&chunk).is_empty());
    }

    #[test]
    fn scenario_one_oom_in_failed_job() {
        let chunk = chunk_with("java.lang.OutOfMemoryError: Java heap space", "1");
        let findings = analyze_chunk(&chunk);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.severity, Severity::Error);
        assert!(f.confidence_score >= 0.90);
        assert_eq!(f.normalized_message, f.raw_message);
        assert_eq!(f.line_number, 1);
    }

    #[test]
    fn scenario_two_noise_in_passing_job_is_ranked_down() {
        let content = "[INFO] server ok\nERROR: expected 404 received\n[INFO] shutting down";
        let chunk = chunk_with(content, "0");
        let findings = analyze_chunk(&chunk);
        assert!(findings.len() <= 1);
        if let Some(f) = findings.first() {
            assert_eq!(f.line_number, 2);
        }
    }

    #[test]
    fn short_lines_are_skipped_before_severity_check() {
        let chunk = chunk_with("ERR x", "1");
        assert!(analyze_chunk(&chunk).is_empty());
    }

    #[test]
    fn global_line_number_accounts_for_chunk_offset() {
        let mut chunk = chunk_with("filler one\njava.lang.OutOfMemoryError: Java heap space", "1");
        chunk.line_start = 501;
        chunk.line_end = 502;
        let findings = analyze_chunk(&chunk);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 502);
    }

    #[test]
    fn context_note_is_populated_from_chunk_boundaries() {
        let chunk = chunk_with("java.lang.OutOfMemoryError: Java heap space", "1");
        let findings = analyze_chunk(&chunk);
        assert_eq!(findings[0].context_note, ContextNote::TruncatedAtChunkBoundaries);
    }
}
