//! Confidence scoring: additive boost/penalty patterns against a suspect
//! line, then an asymptotic shift based on whether the job passed or failed
//! (§4.4 step 5).

use destill_contracts::metadata::ExitState;
use destill_contracts::Severity;
use once_cell::sync::Lazy;
use regex::Regex;

struct WeightedPattern {
    regex: Regex,
    weight: f64,
}

fn pattern(src: &str, weight: f64) -> WeightedPattern {
    WeightedPattern {
        regex: Regex::new(src).expect("static confidence pattern must compile"),
        weight,
    }
}

static BOOST_PATTERNS: Lazy<Vec<WeightedPattern>> = Lazy::new(|| {
    vec![
        pattern(r"(?i)^.{0,50}?(FATAL\[|ERROR:)", 0.25),
        pattern(
            r#"(?i)(^\s*at\s+\S+\(.*\)|Traceback|File "[^"]+", line \d+|panic:|#\d+\s+0x[0-9a-fA-F]+|terminate called)"#,
            0.30,
        ),
        pattern(
            r"npm ERR!|ENOENT|EACCES|ELIFECYCLE|ECONNREFUSED|ECONNRESET|E404|ERESOLVE|\[ERROR\]|BUILD FAILURE|FAILURE:|BUILD FAILED",
            0.30,
        ),
        pattern(
            r"(?i)docker: error|cannot connect to the docker daemon|ErrImagePull|ImagePullBackOff|CrashLoopBackOff|OOMKilled|NodeNotReady|RunContainerError",
            0.30,
        ),
        pattern(
            r"(?i)out of memory|outofmemoryerror|\bOOM\b|SIGSEGV|SIGKILL|SIGABRT|core dumped|\bAborted\b|heap space|memory exhausted",
            0.35,
        ),
        pattern(
            r"(?i)timed out|deadline exceeded|context canceled|context deadline|ETIMEDOUT",
            0.20,
        ),
        pattern(
            r"(?i)exited with|returned non-zero|non-zero exit|exit status [1-9]|exit code [1-9]",
            0.25,
        ),
        pattern(
            r"(?i)SyntaxError|CompileError|compilation error|ImportError|ModuleNotFoundError|cannot find symbol|undefined reference",
            0.25,
        ),
        pattern(
            r"(?i)permission denied|access denied|\b401\b|\b403\b|EACCES",
            0.20,
        ),
        pattern(
            r"(?i)connection refused|connection reset|ECONNREFUSED|ECONNRESET|network unreachable|host unreachable",
            0.20,
        ),
        pattern(r"(?i)AssertionError|assertion failed|assert\(", 0.25),
    ]
});

static ASSERTION_FAILURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)AssertionError|assertion failed|assert\(").unwrap());

static TEST_EXPECT_PENALTY: Lazy<WeightedPattern> =
    Lazy::new(|| pattern(r#"expect\(.*\)\.toThrow|should\.fail|assert\.throws\(Error"#, 0.40));

static PENALTY_PATTERNS: Lazy<Vec<WeightedPattern>> = Lazy::new(|| {
    vec![
        pattern(r"(?i)\b0 errors\b|no errors|errors:\s*0", 0.50),
        pattern(r"(?i)\bcaught\b|\bhandled\b|\brecovered\b|graceful", 0.30),
        pattern(
            r"errorHandler|\.error\(|getError|setError|isError|hasError|lastError|onError|handleError|error_|_error_",
            0.25,
        ),
        pattern(r"(?i)(succeeded|passed|\bok\b).*retry", 0.40),
        pattern(r#"["'](?i:error|fatal|warn|critical|panic)["']"#, 0.30),
        pattern(r"(?i)^usage:|--help|for more information", 0.25),
        pattern(r"(?i)deprecated|deprecation", 0.20),
    ]
});

const COMMENT_LEADERS: &[&str] = &["//", "# ", "/*", "* ", "<!--"];

/// Sum the boost/penalty tables against `line`, fold in the severity term,
/// and clamp to `[0.0, 1.0]`. Does not apply the job-state shift — see
/// [`apply_job_state`].
pub fn score_line(line: &str, severity: Severity) -> f64 {
    let mut score: f64 = 0.5;

    for p in BOOST_PATTERNS.iter() {
        if p.regex.is_match(line) {
            score += p.weight;
        }
    }

    match severity {
        Severity::Fatal => score += 0.20,
        Severity::Error => score += 0.10,
        _ => {}
    }

    for p in PENALTY_PATTERNS.iter() {
        if p.regex.is_match(line) {
            score -= p.weight;
        }
    }

    // A genuine assertion failure that happens to mention `.toThrow` (e.g.
    // reporting the expectation that was violated) still nets the boost
    // instead of being cancelled out by the test-expectation penalty below.
    if TEST_EXPECT_PENALTY.regex.is_match(line) && !ASSERTION_FAILURE_RE.is_match(line) {
        score -= TEST_EXPECT_PENALTY.weight;
    }

    let trimmed = line.trim_start();
    if COMMENT_LEADERS.iter().any(|leader| trimmed.starts_with(leader)) {
        score -= 0.30;
    }

    let lower = line.to_lowercase();
    if lower.contains("test") && lower.contains("passed") {
        score -= 0.30;
    }
    if lower.contains("retry") && !lower.contains("failed") && !lower.contains("error") {
        score -= 0.15;
    }

    score.clamp(0.0, 1.0)
}

/// Shift a clamped score toward the extremes based on the job's exit
/// status (§4.4 step 5, tail). Monotone in `score` for every [`ExitState`]:
/// both branches are affine transforms with positive slope.
pub fn apply_job_state(score: f64, state: ExitState) -> f64 {
    match state {
        ExitState::Failed => 1.0 - (1.0 - score) * 0.4,
        ExitState::Passed => score * 0.6,
        ExitState::Unknown => score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_one_oom_in_failed_job_scores_high() {
        let line = "java.lang.OutOfMemoryError: Java heap space";
        let base = score_line(line, Severity::Error);
        let final_score = apply_job_state(base, ExitState::Failed);
        assert!(final_score >= 0.90, "expected >=0.90, got {final_score}");
    }

    #[test]
    fn scenario_two_noise_in_passing_job_is_penalized_by_point_six() {
        let line = "ERROR: expected 404 received";
        let base = score_line(line, Severity::Error);
        let penalized = apply_job_state(base, ExitState::Passed);
        assert!((penalized - base * 0.6).abs() < 1e-9);
    }

    #[test]
    fn comment_leader_penalizes_score() {
        let commented = score_line("// ERROR: this is not a real error", Severity::Error);
        let bare = score_line("ERROR: this is not a real error extra words", Severity::Error);
        assert!(commented < bare);
    }

    #[test]
    fn error_as_identifier_is_penalized() {
        let line = "calling errorHandler for request id 12";
        let score = score_line(line, Severity::Error);
        assert!(score < 0.5, "expected identifier usage to read as noise, got {score}");
    }

    #[test]
    fn score_is_always_clamped() {
        let huge_boost_line = "FATAL[x] panic: core dumped SIGSEGV heap space memory exhausted timed out ETIMEDOUT exit status 1 AssertionError";
        let score = score_line(huge_boost_line, Severity::Fatal);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn boost_for_failed_job_is_monotone() {
        let (a, b) = (0.2_f64, 0.8_f64);
        assert!(apply_job_state(a, ExitState::Failed) <= apply_job_state(b, ExitState::Failed));
    }

    #[test]
    fn penalty_for_passed_job_is_monotone() {
        let (a, b) = (0.2_f64, 0.8_f64);
        assert!(apply_job_state(a, ExitState::Passed) <= apply_job_state(b, ExitState::Passed));
    }

    #[test]
    fn test_expect_penalty_is_not_applied_when_line_is_a_real_assertion_failure() {
        let line = "AssertionError: expect(result).toThrow(RangeError)";
        let score = score_line(line, Severity::Error);
        let boost_only = score_line("AssertionError: something else entirely", Severity::Error);
        assert!(
            score >= boost_only - 0.01,
            "expected assertion-failure boost to survive, got {score} vs baseline {boost_only}"
        );
    }

    #[test]
    fn test_expect_penalty_still_applies_without_an_assertion_failure() {
        let line = "helper: expect(fn).toThrow() did not throw";
        let score = score_line(line, Severity::Error);
        assert!((score - 0.2).abs() < 1e-9, "expected base(0.6) - penalty(0.4) = 0.2, got {score}");
    }
}
