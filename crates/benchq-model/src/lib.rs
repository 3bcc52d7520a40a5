mod domain;
pub use domain::{BuildRef, CommitId, PullNumber, PullRequest, RepoId, RunId};

mod error;
pub use error::{ModelError, ModelResult};

mod filter;
pub use filter::{BenchmarkDescriptor, FilterSpec, Language, Predicate};

mod record;
pub use record::{Benchmarkable, Run, RunStatus};

mod api;
pub use api::{BenchmarkTrigger, RunStatusUpdate};
