use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Repository identifier in `owner/name` form (e.g. `apache/arrow`).
///
/// Validated on construction, so every `RepoId` in the system has exactly
/// one `/` separating two non-empty, whitespace-free segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId(String);

impl RepoId {
    /// Parse and validate a repository identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owner segment (`apache` in `apache/arrow`).
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map(|(o, _)| o).unwrap_or_default()
    }

    /// Name segment (`arrow` in `apache/arrow`).
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, n)| n).unwrap_or_default()
    }
}

impl TryFrom<String> for RepoId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        let valid = match trimmed.split_once('/') {
            Some((owner, name)) => {
                !owner.is_empty()
                    && !name.is_empty()
                    && !name.contains('/')
                    && !trimmed.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(ModelError::InvalidRepo(s));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl FromStr for RepoId {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl From<RepoId> for String {
    fn from(r: RepoId) -> Self {
        r.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
