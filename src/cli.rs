//! `clap` derive CLI surface (§6): `run <build-url>`, `view <request-id>`,
//! `status <request-id>`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use destill_broker::Broker;
use destill_contracts::{topics, AnalysisRequest, RequestState, RequestStatus};
use destill_store::Store;

use crate::error::Result;
use crate::output::OutputWriter;

/// How long `run` waits for the ranker-sink to produce a result before
/// giving up and telling the operator to poll `status`/`view` separately.
const RUN_WAIT_TIMEOUT: Duration = Duration::from_secs(30);
const RUN_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Parser)]
#[command(name = "destill", version, about = "CI/CD log triage pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit machine-readable JSON instead of a human table.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a build URL for triage and wait for the ranked result.
    Run {
        build_url: String,
    },
    /// Show the ranked triage cards already stored for a request.
    View {
        request_id: String,
    },
    /// Show the lifecycle status of a request.
    Status {
        request_id: String,
    },
}

pub fn run_command(
    broker: &Arc<dyn Broker>,
    store: &Arc<dyn Store>,
    build_url: &str,
    writer: &OutputWriter,
) -> Result<()> {
    let request = AnalysisRequest::new(build_url);
    let bytes = serde_json::to_vec(&request)?;
    broker.publish(topics::REQUESTS, &request.request_id, bytes)?;

    let deadline = Instant::now() + RUN_WAIT_TIMEOUT;
    loop {
        if let Ok(cards) = store.get_findings(&request.request_id) {
            let result = destill_ranker::rank(cards);
            let ranked = destill_ranker::flatten_by_tier(result);
            writer.ranked_cards(&ranked);
            return Ok(());
        }
        if Instant::now() >= deadline {
            writer.error(
                &format!("timed out waiting for results for {}", request.request_id),
                Some("triage is likely still running; check with `status`/`view` shortly"),
            );
            return Ok(());
        }
        std::thread::sleep(RUN_POLL_INTERVAL);
    }
}

pub fn view_command(store: &Arc<dyn Store>, request_id: &str, writer: &OutputWriter) -> Result<()> {
    let cards = store.get_findings(request_id)?;
    let result = destill_ranker::rank(cards);
    let ranked = destill_ranker::flatten_by_tier(result);
    writer.ranked_cards(&ranked);
    Ok(())
}

pub fn status_command(store: &Arc<dyn Store>, request_id: &str, writer: &OutputWriter) -> Result<()> {
    let cards = store.get_findings(request_id).unwrap_or_default();
    let status = RequestStatus {
        request_id: request_id.to_string(),
        build_url: String::new(),
        status: if cards.is_empty() {
            RequestState::Pending
        } else {
            RequestState::Completed
        },
        chunks_total: 0,
        chunks_processed: 0,
        findings_count: cards.len() as u64,
    };
    writer.status(&status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand_with_build_url() {
        let cli = Cli::try_parse_from(["destill", "run", "https://buildkite.com/acme/ci/builds/1"]).unwrap();
        assert!(matches!(cli.command, Command::Run { build_url } if build_url == "https://buildkite.com/acme/ci/builds/1"));
    }

    #[test]
    fn parses_global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["destill", "--json", "status", "req-1"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["destill", "frobnicate"]).is_err());
    }
}
