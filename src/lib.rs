//! destill — CI/CD log triage pipeline.
//!
//! Ingests a CI build's logs, classifies failures with a stateless
//! analyzer, ranks recurring ones against passing-job noise, and serves the
//! result to an operator through a small CLI. The core (chunker, analyzer,
//! ranker, broker, provider, store) lives in the `destill-*` crates under
//! `crates/`; this crate wires them together: configuration, logging, the
//! three run loops, the JUnit collaborator, and the CLI itself.

pub mod agents;
pub mod cancellation;
pub mod cli;
pub mod config;
pub mod error;
pub mod junit;
pub mod logging;
pub mod output;

pub use config::{BrokerKind, Config};
pub use error::{DestillError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
