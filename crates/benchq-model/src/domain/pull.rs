use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{CommitId, error::ModelError};

/// Pull request number. Always positive.
///
/// Deserializes from either a JSON integer or a numeric string, since
/// webhook senders are inconsistent about which one they emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PullNumber(u64);

impl PullNumber {
    pub fn new(n: u64) -> Result<Self, ModelError> {
        if n == 0 {
            return Err(ModelError::InvalidPullNumber(n.to_string()));
        }
        Ok(Self(n))
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl FromStr for PullNumber {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .trim()
            .parse::<u64>()
            .map_err(|_| ModelError::InvalidPullNumber(s.to_string()))?;
        Self::new(n)
    }
}

impl fmt::Display for PullNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for PullNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => PullNumber::new(n),
            Raw::Str(s) => s.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

/// Pull request metadata as reported by the repository client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: PullNumber,
    /// Tip of the pull request branch.
    pub head_commit: CommitId,
    /// Target branch name (e.g. `main`).
    pub base_branch: String,
    /// Tip of the target branch when the pull request was last synchronised.
    pub base_commit: CommitId,
}
