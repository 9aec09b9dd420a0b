//! Typed access to the `metadata: string -> string` side channel carried by
//! [`crate::LogChunk`] and [`crate::TriageCard`].
//!
//! The wire shape stays a flat map (required by §3/§6 of the spec) but
//! in-process code should never sprinkle string literals for the recognized
//! keys. This module is the one place they are enumerated, per the REDESIGN
//! FLAGS note on dynamic metadata dictionaries.

use std::collections::HashMap;

/// Flat wire representation of chunk/card metadata.
pub type MetadataMap = HashMap<String, String>;

pub const KEY_JOB_STATE: &str = "job_state";
pub const KEY_EXIT_STATUS: &str = "exit_status";
pub const KEY_BUILD_URL: &str = "build_url";
pub const KEY_PROVIDER: &str = "provider";
pub const KEY_BUILD_ID: &str = "build_id";
pub const KEY_BUILD_NUMBER: &str = "build_number";
pub const KEY_JOB_TYPE: &str = "job_type";
pub const KEY_RECURRENCE_COUNT: &str = "recurrence_count";

/// Every key this codebase assigns a recognized meaning to. Anything else in
/// a metadata map is provider-specific spillover.
pub const RECOGNIZED_KEYS: &[&str] = &[
    KEY_JOB_STATE,
    KEY_EXIT_STATUS,
    KEY_BUILD_URL,
    KEY_PROVIDER,
    KEY_BUILD_ID,
    KEY_BUILD_NUMBER,
    KEY_JOB_TYPE,
    KEY_RECURRENCE_COUNT,
];

/// The job-state signal the analyzer derives from `exit_status` (§4.4 step 2).
///
/// Distinct from the raw `job_state` metadata string the ranker reads
/// directly (§4.7 step 1) — this one is always derived from `exit_status`,
/// never copied verbatim from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Failed,
    Passed,
    Unknown,
}

/// Derive the exit-status-based job state used to shift analyzer scoring.
pub fn exit_state(metadata: &MetadataMap) -> ExitState {
    match metadata.get(KEY_EXIT_STATUS).map(String::as_str) {
        Some("0") => ExitState::Passed,
        Some(s) if !s.is_empty() => ExitState::Failed,
        _ => ExitState::Unknown,
    }
}

/// Recurrence count carried in metadata, defaulting to 1 (§4.7 step 2).
pub fn recurrence_count(metadata: &MetadataMap) -> u32 {
    metadata
        .get(KEY_RECURRENCE_COUNT)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
}

/// Fluent builder for a metadata map with typed setters for the recognized
/// keys and an escape hatch for provider-specific extras.
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    map: MetadataMap,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_state(mut self, value: impl Into<String>) -> Self {
        self.map.insert(KEY_JOB_STATE.to_string(), value.into());
        self
    }

    pub fn exit_status(mut self, value: impl Into<String>) -> Self {
        self.map.insert(KEY_EXIT_STATUS.to_string(), value.into());
        self
    }

    pub fn build_url(mut self, value: impl Into<String>) -> Self {
        self.map.insert(KEY_BUILD_URL.to_string(), value.into());
        self
    }

    pub fn provider(mut self, value: impl Into<String>) -> Self {
        self.map.insert(KEY_PROVIDER.to_string(), value.into());
        self
    }

    pub fn build_id(mut self, value: impl Into<String>) -> Self {
        self.map.insert(KEY_BUILD_ID.to_string(), value.into());
        self
    }

    pub fn build_number(mut self, value: impl Into<String>) -> Self {
        self.map.insert(KEY_BUILD_NUMBER.to_string(), value.into());
        self
    }

    pub fn job_type(mut self, value: impl Into<String>) -> Self {
        self.map.insert(KEY_JOB_TYPE.to_string(), value.into());
        self
    }

    pub fn recurrence_count(mut self, value: u32) -> Self {
        self.map
            .insert(KEY_RECURRENCE_COUNT.to_string(), value.to_string());
        self
    }

    /// Attach a provider-specific key not in [`RECOGNIZED_KEYS`].
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.map.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> MetadataMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_state_classification() {
        let passed = MetadataBuilder::new().exit_status("0").build();
        let failed = MetadataBuilder::new().exit_status("1").build();
        let unknown: MetadataMap = MetadataMap::new();

        assert_eq!(exit_state(&passed), ExitState::Passed);
        assert_eq!(exit_state(&failed), ExitState::Failed);
        assert_eq!(exit_state(&unknown), ExitState::Unknown);
    }

    #[test]
    fn recurrence_count_defaults_to_one() {
        let empty = MetadataMap::new();
        assert_eq!(recurrence_count(&empty), 1);

        let explicit = MetadataBuilder::new().recurrence_count(5).build();
        assert_eq!(recurrence_count(&explicit), 5);
    }

    #[test]
    fn builder_sets_recognized_and_extra_keys() {
        let map = MetadataBuilder::new()
            .job_state("failed")
            .exit_status("1")
            .build_url("https://buildkite.com/acme/pipeline/builds/42")
            .provider("buildkite")
            .extra("buildkite.org", "acme")
            .build();

        assert_eq!(map.get(KEY_JOB_STATE).unwrap(), "failed");
        assert_eq!(map.get("buildkite.org").unwrap(), "acme");
        assert!(RECOGNIZED_KEYS.contains(&KEY_PROVIDER));
    }
}
