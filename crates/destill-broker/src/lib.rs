//! Topic-keyed pub/sub broker abstraction (§4.1).
//!
//! [`InMemoryBroker`] is the default, best-effort implementation used in a
//! single process. The `redpanda` feature adds [`RedpandaBroker`], a
//! wire-compatible drop-in over a real Kafka/Redpanda cluster, for when
//! `REDPANDA_BROKERS` is configured (§6). Both implement the same
//! [`Broker`] trait; callers write run loops once against the trait.

pub mod error;
pub mod in_memory;
pub mod message;
pub mod subscription;
pub mod traits;

#[cfg(feature = "redpanda")]
pub mod redpanda;

pub use error::BrokerError;
pub use in_memory::InMemoryBroker;
pub use message::Message;
pub use subscription::Subscription;
pub use traits::Broker;

#[cfg(feature = "redpanda")]
pub use redpanda::RedpandaBroker;
