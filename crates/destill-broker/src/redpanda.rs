//! External Kafka/Redpanda-wire-compatible [`Broker`] (§4.1, §6). Unlike
//! the in-memory broker this does not drop messages on a full subscriber
//! queue — Redpanda/Kafka retains them and each subscriber's poll thread
//! simply falls behind instead.
//!
//! Selected by presence of `REDPANDA_BROKERS` in configuration (§6).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::message::Message as _;
use rdkafka::producer::{BaseProducer, BaseRecord, Producer};

use crate::error::BrokerError;
use crate::message::Message;
use crate::subscription::Subscription;
use crate::traits::Broker;

pub struct RedpandaBroker {
    producer: BaseProducer,
    brokers: String,
    closed: Arc<AtomicBool>,
    /// Poll threads started by `subscribe()`, joined by `close()` so that
    /// "after return, all sequences complete" (§4.1) holds even for a
    /// caller still blocked inside a subscriber's `recv()`.
    poll_threads: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl RedpandaBroker {
    /// Connect using a comma-separated broker list, e.g. the value of
    /// `REDPANDA_BROKERS`.
    pub fn connect(brokers: &str) -> Result<Self, BrokerError> {
        let producer: BaseProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "30000")
            .create()
            .map_err(|e| BrokerError::Transport(e.to_string()))?;

        Ok(Self {
            producer,
            brokers: brokers.to_string(),
            closed: Arc::new(AtomicBool::new(false)),
            poll_threads: Mutex::new(Vec::new()),
        })
    }
}

impl Broker for RedpandaBroker {
    fn publish(&self, topic: &str, key: &str, value: Vec<u8>) -> Result<(), BrokerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrokerError::Closed);
        }

        let record = BaseRecord::to(topic).key(key).payload(&value);
        self.producer
            .send(record)
            .map_err(|(e, _)| BrokerError::Transport(e.to_string()))?;
        self.producer.poll(std::time::Duration::from_millis(0));
        Ok(())
    }

    fn subscribe(&self, topic: &str, group_id: &str) -> Result<Subscription, BrokerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrokerError::Closed);
        }

        let consumer: BaseConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| BrokerError::Transport(e.to_string()))?;
        consumer
            .subscribe(&[topic])
            .map_err(|e| BrokerError::Transport(e.to_string()))?;

        // crossbeam channel bridges the blocking rdkafka poll loop to the
        // same Subscription shape the in-memory broker returns. Unbounded:
        // Kafka, not this process, owns retention/backpressure here.
        let (tx, rx) = crossbeam_channel::unbounded();
        let closed = self.closed.clone();
        let handle = thread::spawn(move || {
            loop {
                if closed.load(Ordering::Acquire) {
                    break;
                }
                match consumer.poll(std::time::Duration::from_millis(500)) {
                    Some(Ok(borrowed)) => {
                        let msg = Message {
                            topic: borrowed.topic().to_string(),
                            key: borrowed
                                .key()
                                .map(|k| String::from_utf8_lossy(k).to_string())
                                .unwrap_or_default(),
                            value: borrowed.payload().unwrap_or_default().to_vec(),
                            offset: Some(borrowed.offset() as u64),
                            partition: Some(borrowed.partition()),
                            timestamp: borrowed.timestamp().to_millis(),
                        };
                        if tx.send(msg).is_err() {
                            break; // Subscription dropped
                        }
                    }
                    Some(Err(_)) => continue,
                    None => continue,
                }
            }
        });
        self.poll_threads
            .lock()
            .expect("redpanda poll-thread registry poisoned")
            .push(handle);

        Ok(Subscription { receiver: rx })
    }

    /// Idempotent: signals every poll thread started by `subscribe()` to
    /// stop and joins them before returning, so callers blocked in
    /// `recv()` observe the channel close rather than hanging (§4.1).
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.producer.flush(std::time::Duration::from_secs(5)).ok();
        let handles = std::mem::take(
            &mut *self
                .poll_threads
                .lock()
                .expect("redpanda poll-thread registry poisoned"),
        );
        for handle in handles {
            let _ = handle.join();
        }
    }
}
