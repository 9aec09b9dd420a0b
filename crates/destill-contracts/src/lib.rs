//! Wire-level message contracts for the destill log triage pipeline.
//!
//! Every type here is UTF-8 JSON with snake_case fields on the wire (§6).
//! This crate has no broker, provider, or storage dependency — it is pure
//! data plus the hashing/id helpers every other crate needs to agree on.

pub mod chunk;
pub mod finding;
pub mod ids;
pub mod metadata;
pub mod progress;
pub mod request;
pub mod topics;
pub mod triage_card;

pub use chunk::LogChunk;
pub use finding::{ContextNote, Finding, Severity};
pub use metadata::{MetadataBuilder, MetadataMap};
pub use progress::{ProgressUpdate, RequestState, RequestStatus};
pub use request::AnalysisRequest;
pub use triage_card::{TriageCard, TriageCardContext};
