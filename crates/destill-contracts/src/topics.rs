//! Fixed topic names (§6). Every broker implementation, in-memory or
//! external, speaks these.

pub const REQUESTS: &str = "destill.requests";
pub const LOGS_RAW: &str = "destill.logs.raw";
pub const FINDINGS: &str = "destill.analysis.findings";
pub const PROGRESS: &str = "destill.progress";
