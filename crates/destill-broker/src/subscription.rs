use crossbeam_channel::Receiver;

use crate::message::Message;

/// A lazy sequence of messages delivered to one subscriber (§4.1).
///
/// `recv()` blocks until a message arrives or the broker closes, at which
/// point it returns `None`. `Subscription` also implements `Iterator` so
/// callers can `for message in subscription { ... }`.
pub struct Subscription {
    pub(crate) receiver: Receiver<Message>,
}

impl Subscription {
    /// Block until the next message, or return `None` once the broker (or
    /// just this subscriber's queue) has been closed.
    pub fn recv(&self) -> Option<Message> {
        self.receiver.recv().ok()
    }

    /// Non-blocking poll; `None` both when empty and when closed — callers
    /// that need to distinguish the two should prefer `recv` with a
    /// cancellation token race instead.
    pub fn try_recv(&self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Block up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Message> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

impl Iterator for Subscription {
    type Item = Message;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}
