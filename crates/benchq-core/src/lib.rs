pub mod baseline;
pub mod clients;
pub mod command;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod scheduler;
pub mod service;
pub mod signature;
pub mod store;

#[cfg(test)]
mod fakes;

pub mod prelude {
    pub use crate::clients::{BuildTrigger, ClientError, RepositoryClient};
    pub use crate::command::CommandParser;
    pub use crate::config::{ConfigProvider, RepoSettings, Secret, StaticConfigProvider};
    pub use crate::error::ServiceError;
    pub use crate::metrics::{MetricsBackend, MetricsHandle, RequestOutcome};
    pub use crate::notify::Links;
    pub use crate::service::{BenchmarkService, Collaborators, ScheduleReceipt, ServiceSettings};
    pub use crate::store::{BenchStore, InMemoryStore};
}
