use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Git commit identifier.
///
/// Hex object name, 7 to 64 characters (abbreviated SHA-1 up to full SHA-256),
/// normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

const MIN_LEN: usize = 7;
const MAX_LEN: usize = 64;

impl CommitId {
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 7 characters, the way commits are usually referenced in comments.
    pub fn short(&self) -> &str {
        &self.0[..MIN_LEN]
    }
}

impl TryFrom<String> for CommitId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        if !(MIN_LEN..=MAX_LEN).contains(&trimmed.len())
            || !trimmed.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(ModelError::InvalidCommit(s));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }
}

impl FromStr for CommitId {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl From<CommitId> for String {
    fn from(c: CommitId) -> Self {
        c.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_to_lowercase() {
        let c = CommitId::new("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
        assert_eq!(c.as_str(), "abcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(c.short(), "abcdef0");
    }

    #[test]
    fn rejects_non_hex_and_bad_lengths() {
        let too_long = "a".repeat(65);
        let bad = ["", "abc", "zzzzzzzz", "main", too_long.as_str()];

        for input in bad {
            assert!(
                CommitId::new(input).is_err(),
                "expected error for commit {input:?}"
            );
        }
    }
}
