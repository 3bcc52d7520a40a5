//! HTTP implementations of the core collaborator traits.
mod error;
pub use error::IntegrationError;

pub mod buildkite;
pub use buildkite::{BuildkiteClient, BuildkiteConfig};

pub mod github;
pub use github::{GithubClient, GithubConfig};

mod http;
