//! The Store capability: persist and read triage cards (§6).

pub mod error;
pub mod in_memory;
pub mod traits;

#[cfg(feature = "durable-store")]
pub mod durable;

pub use error::StoreError;
pub use in_memory::InMemoryStore;
pub use traits::Store;

#[cfg(feature = "durable-store")]
pub use durable::DurableStore;
