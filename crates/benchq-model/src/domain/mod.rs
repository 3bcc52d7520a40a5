mod repo;
pub use repo::RepoId;

mod commit;
pub use commit::CommitId;

mod pull;
pub use pull::{PullNumber, PullRequest};

mod ids;
pub use ids::{BuildRef, RunId};
