use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Benchmark implementation language.
///
/// Closed set: a language outside of it is rejected rather than matched
/// against nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    Python,
    Cpp,
    R,
    Java,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::Cpp,
        Language::R,
        Language::Java,
        Language::JavaScript,
    ];

    /// Canonical display name (`C++`, not `cpp`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Cpp => "C++",
            Language::R => "R",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
        }
    }
}

impl FromStr for Language {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "c++" | "cpp" => Ok(Language::Cpp),
            "r" => Ok(Language::R),
            "java" => Ok(Language::Java),
            "javascript" => Ok(Language::JavaScript),
            _ => Err(ModelError::UnknownLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = ModelError;
    fn try_from(s: String) -> ModelResult<Self> {
        s.parse()
    }
}

impl From<Language> for String {
    fn from(l: Language) -> Self {
        l.as_str().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
