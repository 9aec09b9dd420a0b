//! Splits one job's log into overlapping, line-aligned, byte-bounded
//! chunks so analysis scales to arbitrarily large logs while still
//! preserving context across the chunk boundary (§4.3).

use destill_contracts::{LogChunk, MetadataMap};

/// Target byte size of a chunk (§4.3 default).
pub const DEFAULT_TARGET_CHUNK_SIZE: usize = 500 * 1024;

/// Number of lines copied verbatim between adjacent chunks (§4.3 default).
pub const DEFAULT_CONTEXT_OVERLAP: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub target_chunk_size: usize,
    pub context_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_chunk_size: DEFAULT_TARGET_CHUNK_SIZE,
            context_overlap: DEFAULT_CONTEXT_OVERLAP,
        }
    }
}

struct NumberedLine {
    /// 1-based, global to the source log.
    global_line: u64,
    text: String,
}

/// Split `content` into ordered [`LogChunk`]s for one job, with default
/// sizing (§4.3).
#[allow(clippy::too_many_arguments)]
pub fn chunk(
    content: &str,
    request_id: &str,
    build_id: &str,
    job_name: &str,
    job_id: &str,
    metadata: &MetadataMap,
) -> Vec<LogChunk> {
    chunk_with_config(
        content,
        request_id,
        build_id,
        job_name,
        job_id,
        metadata,
        ChunkerConfig::default(),
    )
}

/// Same as [`chunk`] with explicit sizing, for tests and tuning.
#[allow(clippy::too_many_arguments)]
pub fn chunk_with_config(
    content: &str,
    request_id: &str,
    build_id: &str,
    job_name: &str,
    job_id: &str,
    metadata: &MetadataMap,
    config: ChunkerConfig,
) -> Vec<LogChunk> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let total_bytes: usize = lines.iter().map(|l| l.len() + 1).sum();

    let groups: Vec<Vec<NumberedLine>> = if total_bytes <= config.target_chunk_size {
        vec![lines
            .iter()
            .enumerate()
            .map(|(i, l)| NumberedLine {
                global_line: i as u64 + 1,
                text: (*l).to_string(),
            })
            .collect()]
    } else {
        split_with_overlap(&lines, config)
    };

    let total_chunks = groups.len();
    groups
        .into_iter()
        .enumerate()
        .map(|(chunk_index, group)| {
            let line_start = group.first().expect("non-empty chunk").global_line;
            let line_end = group.last().expect("non-empty chunk").global_line;
            let content = group
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");

            LogChunk {
                request_id: request_id.to_string(),
                build_id: build_id.to_string(),
                job_name: job_name.to_string(),
                job_id: job_id.to_string(),
                chunk_index,
                total_chunks,
                content,
                line_start,
                line_end,
                metadata: metadata.clone(), // copied, never aliased (§4.3)
            }
        })
        .collect()
}

fn split_with_overlap(lines: &[&str], config: ChunkerConfig) -> Vec<Vec<NumberedLine>> {
    let mut groups: Vec<Vec<NumberedLine>> = Vec::new();
    let mut carry: Vec<NumberedLine> = Vec::new();
    let mut idx = 0usize;

    while idx < lines.len() {
        let mut current: Vec<NumberedLine> = carry
            .iter()
            .map(|l| NumberedLine {
                global_line: l.global_line,
                text: l.text.clone(),
            })
            .collect();
        let mut current_bytes: usize = current.iter().map(|l| l.text.len() + 1).sum();
        let mut added_new = false;

        while idx < lines.len() {
            let line = lines[idx];
            let line_bytes = line.len() + 1;
            let would_be = current_bytes + line_bytes;
            if added_new && would_be > config.target_chunk_size {
                break;
            }
            current.push(NumberedLine {
                global_line: idx as u64 + 1,
                text: line.to_string(),
            });
            current_bytes = would_be;
            idx += 1;
            added_new = true;
        }

        let overlap_n = config.context_overlap.min(current.len());
        carry = current[current.len() - overlap_n..]
            .iter()
            .map(|l| NumberedLine {
                global_line: l.global_line,
                text: l.text.clone(),
            })
            .collect();

        groups.push(current);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use destill_contracts::MetadataBuilder;

    fn meta() -> MetadataMap {
        MetadataBuilder::new().exit_status("1").build()
    }

    #[test]
    fn empty_content_yields_no_chunks() {
        let chunks = chunk("", "req-1", "build-1", "job", "job-1", &meta());
        assert!(chunks.is_empty());
    }

    #[test]
    fn small_log_is_a_single_chunk() {
        let content = "line one\nline two\nline three";
        let chunks = chunk(content, "req-1", "build-1", "job", "job-1", &meta());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].total_chunks, 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].line_start, 1);
        assert_eq!(chunks[0].line_end, 3);
    }

    #[test]
    fn metadata_is_cloned_per_chunk_not_aliased() {
        let content = "a".repeat(10);
        let chunks = chunk(&content, "req-1", "build-1", "job", "job-1", &meta());
        let mut first = chunks[0].metadata.clone();
        first.insert("mutated".into(), "yes".into());
        assert!(!chunks[0].metadata.contains_key("mutated"));
    }

    /// Scenario 3 (§8): 1000 lines of 600 bytes each must split into at
    /// least two chunks whose adjacent overlaps match and whose line
    /// ranges cover the whole log with no gaps.
    #[test]
    fn scenario_three_large_log_overlaps_and_covers_all_lines() {
        let lines: Vec<String> = (1..=1000).map(|i| format!("{:0>596}-{i:04}", "x")).collect();
        let content = lines.join("\n");
        assert!(lines[0].len() >= 600, "each line should be ~600 bytes");

        let config = ChunkerConfig {
            target_chunk_size: 500 * 1024,
            context_overlap: 50,
        };
        let chunks = chunk_with_config(&content, "req-1", "build-1", "job", "job-1", &meta(), config);

        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].line_start, 1);
        assert_eq!(chunks.last().unwrap().line_end, 1000);

        for w in chunks.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            let a_lines: Vec<&str> = a.content.lines().collect();
            let b_lines: Vec<&str> = b.content.lines().collect();
            let a_tail = &a_lines[a_lines.len() - 50..];
            let b_head = &b_lines[..50];
            assert_eq!(a_tail, b_head, "last 50 lines of chunk i must equal first 50 of chunk i+1");
        }

        // coverage: every global line number 1..=1000 appears in at least one chunk
        let mut covered = vec![false; 1001];
        for c in &chunks {
            for n in c.line_start..=c.line_end {
                covered[n as usize] = true;
            }
        }
        assert!(covered[1..=1000].iter().all(|&c| c));
    }

    #[test]
    fn chunk_index_and_total_chunks_invariant_holds() {
        let content = "x".repeat(1000).lines().collect::<Vec<_>>().join("\n");
        let big = (0..2000).map(|_| "y".repeat(400)).collect::<Vec<_>>().join("\n");
        let chunks = chunk(&big, "req-1", "build-1", "job", "job-1", &meta());
        for c in &chunks {
            assert!(c.chunk_index < c.total_chunks);
            assert!(c.line_start <= c.line_end);
        }
        let _ = content;
    }

    #[test]
    fn single_line_larger_than_target_still_makes_progress() {
        let huge_line = "z".repeat(DEFAULT_TARGET_CHUNK_SIZE * 2);
        let content = format!("{huge_line}\nsecond");
        let chunks = chunk(&content, "req-1", "build-1", "job", "job-1", &meta());
        assert!(!chunks.is_empty());
        assert_eq!(chunks.last().unwrap().line_end, 2);
    }
}
