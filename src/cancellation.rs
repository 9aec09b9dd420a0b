//! Cooperative cancellation (§5): every long-running loop in `agents`
//! checks this at each suspension point and before each blocking broker
//! call. A thin newtype over `tokio_util::sync::CancellationToken` so the
//! run loops don't depend on `tokio_util` directly by name.

#[derive(Clone, Default)]
pub struct CancellationToken(tokio_util::sync::CancellationToken);

impl CancellationToken {
    pub fn new() -> Self {
        Self(tokio_util::sync::CancellationToken::new())
    }

    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.0.cancelled().await;
    }
}
