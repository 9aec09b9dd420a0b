//! The `Provider` capability: the narrow interface the ingestor uses to
//! reach external CI systems (§4.2). Buildkite and GitHub Actions are the
//! two recognized providers; the registry's only job is attaching
//! credentials at construction time (§9).

pub mod buildkite;
pub mod error;
pub mod github_actions;
pub mod model;
pub mod registry;
pub mod retry;
pub mod traits;
pub mod url;

pub use buildkite::BuildkiteProvider;
pub use error::ProviderError;
pub use github_actions::GitHubActionsProvider;
pub use model::{Artifact, Build, BuildRef, Job, RequestContext};
pub use registry::{ProviderCredentials, ProviderKind, ProviderRegistry};
pub use traits::Provider;
