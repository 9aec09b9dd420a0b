//! destill — CI/CD log triage pipeline CLI entry point.
//!
//! Wires configuration, logging, the broker/provider/store backends, and
//! the three run loops together, then dispatches to the requested
//! subcommand. The run loops live for the duration of the process.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use destill::agents::{analyzer_agent, ingestor, ranker_sink};
use destill::cancellation::CancellationToken;
use destill::cli::{self, Cli, Command};
use destill::config::BrokerKind;
use destill::output::OutputWriter;
use destill::{Config, DestillError};

use destill_broker::{Broker, InMemoryBroker};
use destill_provider::{ProviderCredentials, ProviderRegistry};
use destill_store::{InMemoryStore, Store};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.json);

    match run(cli, &writer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            writer.error(&e.to_string(), e.hint());
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: Cli, writer: &OutputWriter) -> destill::Result<()> {
    let config = Config::from_env()?;
    destill::logging::init_logging(&config)?;

    let broker: Arc<dyn Broker> = build_broker(&config)?;
    let store: Arc<dyn Store> = build_store(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let cancel = CancellationToken::new();
    let registry = ProviderRegistry::new(ProviderCredentials {
        buildkite_token: config.buildkite_api_token.clone(),
        github_token: config.github_token.clone(),
    });
    let handles = spawn_agents(&broker, &store, registry, &runtime, cancel.clone());

    let result = match cli.command {
        Command::Run { build_url } => cli::run_command(&broker, &store, &build_url, writer),
        Command::View { request_id } => cli::view_command(&store, &request_id, writer),
        Command::Status { request_id } => cli::status_command(&store, &request_id, writer),
    };

    cancel.cancel();
    broker.close();
    for handle in handles {
        let _ = handle.join();
    }

    result
}

fn spawn_agents(
    broker: &Arc<dyn Broker>,
    store: &Arc<dyn Store>,
    registry: ProviderRegistry,
    runtime: &tokio::runtime::Runtime,
    cancel: CancellationToken,
) -> Vec<std::thread::JoinHandle<()>> {
    let handle = runtime.handle().clone();

    let ingestor_broker = broker.clone();
    let ingestor_cancel = cancel.clone();
    let ingestor_handle = std::thread::spawn(move || {
        if let Err(e) = ingestor::run(ingestor_broker, registry, handle, ingestor_cancel) {
            tracing::warn!(error = %e, "ingestor loop exited with error");
        }
    });

    let analyzer_broker = broker.clone();
    let analyzer_cancel = cancel.clone();
    let analyzer_handle = std::thread::spawn(move || {
        if let Err(e) = analyzer_agent::run(analyzer_broker, analyzer_cancel) {
            tracing::warn!(error = %e, "analyzer agent loop exited with error");
        }
    });

    let ranker_broker = broker.clone();
    let ranker_store = store.clone();
    let ranker_handle = std::thread::spawn(move || {
        if let Err(e) = ranker_sink::run(ranker_broker, ranker_store, cancel) {
            tracing::warn!(error = %e, "ranker-sink loop exited with error");
        }
    });

    vec![ingestor_handle, analyzer_handle, ranker_handle]
}

fn build_broker(config: &Config) -> destill::Result<Arc<dyn Broker>> {
    match config.broker_kind() {
        BrokerKind::InMemory => Ok(Arc::new(InMemoryBroker::new())),
        BrokerKind::Redpanda => build_redpanda_broker(config),
    }
}

#[cfg(feature = "redpanda")]
fn build_redpanda_broker(config: &Config) -> destill::Result<Arc<dyn Broker>> {
    let brokers = config
        .redpanda_brokers
        .as_deref()
        .expect("broker_kind() only returns Redpanda when redpanda_brokers is set");
    let broker = destill_broker::RedpandaBroker::connect(brokers)?;
    Ok(Arc::new(broker))
}

#[cfg(not(feature = "redpanda"))]
fn build_redpanda_broker(_config: &Config) -> destill::Result<Arc<dyn Broker>> {
    Err(DestillError::Config(
        "REDPANDA_BROKERS is set but this binary was built without the `redpanda` feature".into(),
    ))
}

fn build_store(config: &Config) -> destill::Result<Arc<dyn Store>> {
    match build_durable_store(config) {
        Some(result) => result,
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

#[cfg(feature = "durable-store")]
fn build_durable_store(config: &Config) -> Option<destill::Result<Arc<dyn Store>>> {
    Some(
        destill_store::DurableStore::open(&config.durable_store_path)
            .map(|s| Arc::new(s) as Arc<dyn Store>)
            .map_err(DestillError::from),
    )
}

#[cfg(not(feature = "durable-store"))]
fn build_durable_store(_config: &Config) -> Option<destill::Result<Arc<dyn Store>>> {
    None
}
