//! The three long-lived run loops (§9 REDESIGN FLAGS: "the core has exactly
//! three long-lived run loops"): the ingestor, the analyzer agent, and the
//! ranker-sink. Each owns one broker subscription and never propagates a
//! per-message error out of the loop (§7) — only a *broker-closed* or
//! cancellation ends one.

pub mod analyzer_agent;
pub mod ingestor;
pub mod ranker_sink;
