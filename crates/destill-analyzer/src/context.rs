//! Bounded context extraction around a finding line, within the chunk only
//! (§4.4 step 8).

use destill_contracts::ContextNote;

/// Defaults per §4.4 step 8.
pub const PRE_CONTEXT_LINES: usize = 15;
pub const POST_CONTEXT_LINES: usize = 30;

/// Collect up to `pre_n` preceding and `post_n` following non-empty lines
/// around `idx`, and note whether either side was clipped by the chunk
/// boundary.
pub fn extract_context(
    lines: &[&str],
    idx: usize,
    pre_n: usize,
    post_n: usize,
) -> (Vec<String>, Vec<String>, ContextNote) {
    let pre_candidates: Vec<&str> = lines[..idx]
        .iter()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .take(pre_n)
        .copied()
        .collect();
    let pre_clipped = pre_candidates.len() < pre_n;
    let mut pre_context: Vec<String> = pre_candidates.into_iter().map(String::from).collect();
    pre_context.reverse();

    let post_candidates: Vec<&str> = lines[idx + 1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .take(post_n)
        .copied()
        .collect();
    let post_clipped = post_candidates.len() < post_n;
    let post_context: Vec<String> = post_candidates.into_iter().map(String::from).collect();

    (
        pre_context,
        post_context,
        ContextNote::from_clipping(pre_clipped, post_clipped),
    )
}
