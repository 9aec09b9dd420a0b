use serde::{Deserialize, Serialize};

use crate::metadata::MetadataMap;

/// An immutable, line-aligned slice of one job's log (§3, §4.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogChunk {
    pub request_id: String,
    pub build_id: String,
    pub job_name: String,
    pub job_id: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub content: String,
    /// 1-based, inclusive, aligned to whole lines of the source log.
    pub line_start: u64,
    pub line_end: u64,
    pub metadata: MetadataMap,
}

impl LogChunk {
    /// Validate the invariants §3 requires of every chunk in isolation.
    /// Cross-chunk invariants (coverage, overlap) are the chunker's job to
    /// uphold and the chunker's tests to verify.
    pub fn is_well_formed(&self) -> bool {
        self.chunk_index < self.total_chunks && self.line_start <= self.line_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataBuilder;

    fn sample() -> LogChunk {
        LogChunk {
            request_id: "req-1".into(),
            build_id: "build-1".into(),
            job_name: "test".into(),
            job_id: "job-1".into(),
            chunk_index: 0,
            total_chunks: 1,
            content: "line one\nline two\n".into(),
            line_start: 1,
            line_end: 2,
            metadata: MetadataBuilder::new().exit_status("0").build(),
        }
    }

    #[test]
    fn well_formed_chunk_passes() {
        assert!(sample().is_well_formed());
    }

    #[test]
    fn chunk_index_must_be_below_total() {
        let mut c = sample();
        c.chunk_index = 1;
        c.total_chunks = 1;
        assert!(!c.is_well_formed());
    }

    #[test]
    fn line_start_must_not_exceed_line_end() {
        let mut c = sample();
        c.line_start = 5;
        c.line_end = 4;
        assert!(!c.is_well_formed());
    }
}
