use benchq_model::{CommitId, PullNumber, PullRequest};
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

fn decode_err(reason: impl ToString) -> IntegrationError {
    IntegrationError::Decode {
        service: "github",
        reason: reason.to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Pull {
    pub number: u64,
    pub head: GitRef,
    pub base: GitRef,
}

impl Pull {
    pub fn into_model(self) -> Result<PullRequest, IntegrationError> {
        Ok(PullRequest {
            number: PullNumber::new(self.number).map_err(decode_err)?,
            head_commit: CommitId::new(self.head.sha).map_err(decode_err)?,
            base_branch: self.base.name,
            base_commit: CommitId::new(self.base.sha).map_err(decode_err)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Compare {
    pub merge_base_commit: CommitRef,
}

impl Compare {
    pub fn merge_base(self) -> Result<CommitId, IntegrationError> {
        CommitId::new(self.merge_base_commit.sha).map_err(decode_err)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct NewComment<'a> {
    pub body: &'a str,
}
