//! Best-effort in-memory broker.
//!
//! Built the way the teacher's `BulletinBoard`/`JobManager` shared state is
//! built: a `RwLock`-guarded map, shared-read for the hot path (publish),
//! exclusive-write for the rare structural change (subscribe/close) — see
//! §5 "Shared resources".

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crossbeam_channel::{bounded, Sender};
use tracing::debug;

use crate::error::BrokerError;
use crate::message::Message;
use crate::subscription::Subscription;
use crate::traits::Broker;

/// Default bounded capacity of each subscriber's queue (§4.1).
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

struct SubscriberHandle {
    group_id: String,
    sender: Sender<Message>,
}

/// Best-effort in-memory [`Broker`]. Drops messages for a subscriber whose
/// queue is full rather than blocking the publisher — acceptable because
/// the target external broker does not drop and the analyzer is idempotent
/// with respect to `TriageCard.id` (§4.1).
pub struct InMemoryBroker {
    topics: RwLock<HashMap<String, Vec<SubscriberHandle>>>,
    queue_capacity: usize,
    closed: AtomicBool,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            queue_capacity,
            closed: AtomicBool::new(false),
        }
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker for InMemoryBroker {
    fn publish(&self, topic: &str, key: &str, value: Vec<u8>) -> Result<(), BrokerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrokerError::Closed);
        }

        let message = Message::new(topic, key, value);
        let topics = self.topics.read().expect("broker topic table poisoned");
        if let Some(subscribers) = topics.get(topic) {
            for sub in subscribers {
                if sub.sender.try_send(message.clone()).is_err() {
                    debug!(
                        topic,
                        key,
                        group_id = sub.group_id.as_str(),
                        "subscriber queue full, dropping message"
                    );
                }
            }
        }
        Ok(())
    }

    fn subscribe(&self, topic: &str, group_id: &str) -> Result<Subscription, BrokerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrokerError::Closed);
        }

        let (sender, receiver) = bounded(self.queue_capacity);
        let mut topics = self.topics.write().expect("broker topic table poisoned");
        topics
            .entry(topic.to_string())
            .or_default()
            .push(SubscriberHandle {
                group_id: group_id.to_string(),
                sender,
            });

        Ok(Subscription { receiver })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let mut topics = self.topics.write().expect("broker topic table poisoned");
        topics.clear(); // drops every Sender; blocked receivers observe closed channels
    }
}
