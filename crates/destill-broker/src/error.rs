use thiserror::Error;

/// Broker-level failures (§4.1). Every implementation must surface exactly
/// these kinds; nothing else is part of the contract.
#[derive(Debug, Error, Clone)]
pub enum BrokerError {
    /// The broker has been closed; terminal for whichever run loop sees it.
    #[error("broker is closed")]
    Closed,

    /// Transport-level failure from an external broker implementation
    /// (never produced by the in-memory broker).
    #[error("broker transport error: {0}")]
    Transport(String),
}
