//! Identifier and hashing helpers shared across the pipeline.

use chrono::Utc;
use rand::Rng;

/// Generate a `request_id` in the `req-YYYYMMDDTHHMMSS-XXXXXXXX` form
/// required by §6: a UTC timestamp followed by 8 lowercase hex characters of
/// uniform random, which makes the id sort lexicographically by time.
pub fn new_request_id() -> String {
    request_id_at(Utc::now())
}

fn request_id_at(now: chrono::DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%dT%H%M%S");
    let mut rng = rand::rng();
    let suffix: u32 = rng.random();
    format!("req-{stamp}-{suffix:08x}")
}

/// Compute the `message_hash` of a normalized message: a hex digest, stable
/// across runs and a pure function of the input (§3 invariant, §8 hash law).
pub fn message_hash(normalized_message: &str) -> String {
    hex::encode(blake3::hash(normalized_message.as_bytes()).as_bytes())
}

/// First 8 hex characters of a message hash, used to build finding/card ids.
pub fn short_hash(normalized_message: &str) -> String {
    message_hash(normalized_message)[..8].to_string()
}
