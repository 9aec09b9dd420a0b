//! Message normalization for hashing/grouping (§4.4 step 7).
//!
//! Order matters: timestamps before UUIDs before hex before bare integers,
//! so that a timestamp's digits never get caught by the later, broader
//! integer pass.

use once_cell::sync::Lazy;
use regex::Regex;

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?").unwrap()
});
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});
static HEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x[0-9a-fA-F]+").unwrap());
static NUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

pub fn normalize(line: &str) -> String {
    let s = TIMESTAMP_RE.replace_all(line, "[TIMESTAMP]");
    let s = UUID_RE.replace_all(&s, "[UUID]");
    let s = HEX_RE.replace_all(&s, "[HEX]");
    let s = NUM_RE.replace_all(&s, "[NUM]");
    s.trim().to_string()
}
