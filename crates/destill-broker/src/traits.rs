use crate::error::BrokerError;
use crate::subscription::Subscription;

/// Topic-keyed pub/sub broker (§4.1).
///
/// Ordering: for a single `(topic, key)` pair, subscribers observe messages
/// in publish order; across keys, no ordering is promised. Delivery
/// semantics differ by implementation — the in-memory broker drops
/// messages for a subscriber whose queue is full, the external broker does
/// not. Implementations must document which they provide.
pub trait Broker: Send + Sync {
    /// Append one message to `topic` under `key`.
    fn publish(&self, topic: &str, key: &str, value: Vec<u8>) -> Result<(), BrokerError>;

    /// Subscribe to `topic` under a consumer `group_id`. `group_id` is
    /// semantically a consumer group; an in-memory implementation may
    /// ignore it and broadcast to every subscriber regardless (§4.1).
    fn subscribe(&self, topic: &str, group_id: &str) -> Result<Subscription, BrokerError>;

    /// Idempotent. After this returns, every outstanding subscription's
    /// sequence completes.
    fn close(&self);
}
