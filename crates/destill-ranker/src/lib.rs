//! Cross-job deduplication, tier classification, and stable ordering of
//! [`TriageCard`]s (§4.7). Pure, deterministic, and total: `rank` never
//! fails and never panics on its input.

use std::collections::HashMap;

use serde::Serialize;

use destill_contracts::metadata::{recurrence_count, KEY_JOB_STATE};
use destill_contracts::TriageCard;

/// A recurring pattern observed only on failing jobs is worth an operator's
/// attention; one also seen on passing jobs is probably noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Unique = 1,
    Noise = 3,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCard {
    pub card: TriageCard,
    pub tier: Tier,
    /// 1-based, assigned after flattening unique-first (see [`flatten_by_tier`]).
    pub rank: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RankResult {
    pub unique: Vec<RankedCard>,
    pub noise: Vec<RankedCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobStateFold {
    Failed,
    Passed,
    Both,
}

/// Fold every card's `job_state` metadata into one state per
/// `normalized_message` (§4.7 step 1). Cards without the key are excluded
/// from the map entirely, not folded as a third state.
fn build_job_state_map(cards: &[TriageCard]) -> HashMap<String, JobStateFold> {
    let mut map: HashMap<String, JobStateFold> = HashMap::new();

    for card in cards {
        let Some(state) = card.metadata.get(KEY_JOB_STATE) else {
            continue;
        };

        let observed = match state.as_str() {
            "failed" => JobStateFold::Failed,
            "passed" => JobStateFold::Passed,
            _ => continue,
        };

        map.entry(card.normalized_message.clone())
            .and_modify(|existing| {
                if *existing != observed {
                    *existing = JobStateFold::Both;
                }
            })
            .or_insert(observed);
    }

    map
}

fn classify_tier(job_states: &HashMap<String, JobStateFold>, normalized_message: &str) -> Tier {
    match job_states.get(normalized_message) {
        None => Tier::Unique,
        Some(JobStateFold::Failed) => Tier::Unique,
        Some(JobStateFold::Passed) | Some(JobStateFold::Both) => Tier::Noise,
    }
}

/// Deduplicate and classify `cards` into unique/noise buckets (§4.7).
pub fn rank(cards: Vec<TriageCard>) -> RankResult {
    let job_states = build_job_state_map(&cards);

    let mut sorted = cards;
    sorted.sort_by(|a, b| {
        b.confidence_score
            .partial_cmp(&a.confidence_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let rec_a = recurrence_count(&a.metadata);
                let rec_b = recurrence_count(&b.metadata);
                rec_b.cmp(&rec_a)
            })
    });

    let mut seen = std::collections::HashSet::new();
    let mut result = RankResult::default();

    for card in sorted {
        if !seen.insert(card.normalized_message.clone()) {
            continue; // subsequent occurrence of an already-seen message (§4.7 step 4)
        }

        let tier = classify_tier(&job_states, &card.normalized_message);
        let ranked = RankedCard { card, tier, rank: 0 };
        match tier {
            Tier::Unique => result.unique.push(ranked),
            Tier::Noise => result.noise.push(ranked),
        }
    }

    result
}

/// Concatenate unique then noise, assigning 1-based rank in that order.
pub fn flatten_by_tier(mut result: RankResult) -> Vec<RankedCard> {
    let mut next_rank = 1usize;
    for card in result.unique.iter_mut().chain(result.noise.iter_mut()) {
        card.rank = next_rank;
        next_rank += 1;
    }

    let mut flattened = result.unique;
    flattened.extend(result.noise);
    flattened
}

/// Count distinct `job_name`s on which `pattern` appears (as a substring of
/// `normalized_message`) with `job_state == "passed"` (used by the UI).
pub fn count_passing_jobs(cards: &[TriageCard], pattern: &str) -> usize {
    let mut job_names = std::collections::HashSet::new();
    for card in cards {
        let passed = card
            .metadata
            .get(KEY_JOB_STATE)
            .map(|s| s == "passed")
            .unwrap_or(false);
        if passed && card.normalized_message.contains(pattern) {
            job_names.insert(card.job_name.clone());
        }
    }
    job_names.len()
}
