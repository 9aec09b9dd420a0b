//! Severity detection: first-match-wins, case-insensitive, whole-word (§4.4 step 4).

use destill_contracts::Severity;
use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately not `\b`-anchored on both sides: exception class names like
// `OutOfMemoryError` or `AssertionError` are CamelCase compounds where
// "Error" has no trailing word boundary, and they are exactly the lines
// this pass needs to catch. Confidence scoring downstream penalizes the
// cases where this is too liberal (e.g. `errorHandler`).
static FATAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(fatal|panic|critical)").unwrap());
static ERROR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(error|err\b|exception|failure|failed)").unwrap());
static WARN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(warn|warning)").unwrap());

pub fn detect_severity(line: &str) -> Severity {
    if FATAL_RE.is_match(line) {
        Severity::Fatal
    } else if ERROR_RE.is_match(line) {
        Severity::Error
    } else if WARN_RE.is_match(line) {
        Severity::Warn
    } else {
        Severity::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_four_severity_detection() {
        assert_eq!(detect_severity("FATAL: x"), Severity::Fatal);
        assert_eq!(detect_severity("ERROR: y"), Severity::Error);
        assert_eq!(detect_severity("WARN: z"), Severity::Warn);
        assert_eq!(detect_severity("INFO: k"), Severity::Info);
    }

    #[test]
    fn fatal_wins_over_error_when_both_present() {
        assert_eq!(detect_severity("PANIC: caused an ERROR"), Severity::Fatal);
    }
}
