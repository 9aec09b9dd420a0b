use thiserror::Error;

/// Error taxonomy for the Store capability (§6, §7).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no findings stored for request {request_id}")]
    NotFound { request_id: String },

    #[error("no finding with hash {message_hash} for request {request_id}")]
    HashNotFound {
        request_id: String,
        message_hash: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
