use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    PullNumber, RepoId,
    error::{ModelError, ModelResult},
};

/// Inbound benchmark trigger.
///
/// Wire form: `{"repo": "owner/name", "pull_number": 123, "filters": "lang=Python"}`.
/// `pull_number` may also be a numeric string; `filters` is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BenchmarkTrigger {
    pub repo: RepoId,
    pub pull_number: PullNumber,
    /// Free-text filter command tail; empty means "run everything".
    pub filters: String,
}

#[derive(Deserialize)]
struct RawTrigger {
    #[serde(default)]
    repo: Option<Value>,
    #[serde(default)]
    pull_number: Option<Value>,
    #[serde(default)]
    filters: Option<Value>,
}

impl BenchmarkTrigger {
    /// Decode and validate a trigger from the raw request body.
    ///
    /// Field checks run in a fixed order (`repo`, then `pull_number`) so the
    /// caller gets a stable error for bodies missing both.
    pub fn from_slice(body: &[u8]) -> ModelResult<Self> {
        let raw: RawTrigger = serde_json::from_slice(body)
            .map_err(|e| ModelError::Invalid(format!("request body is not a JSON object: {e}")))?;

        let repo = match raw.repo {
            None | Some(Value::Null) => return Err(ModelError::MissingField("repo")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(ModelError::MissingField("repo"));
            }
            Some(Value::String(s)) => RepoId::new(s)?,
            Some(other) => return Err(ModelError::InvalidRepo(other.to_string())),
        };

        let pull_number = match raw.pull_number {
            None | Some(Value::Null) => return Err(ModelError::MissingField("pull_number")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(ModelError::MissingField("pull_number"));
            }
            Some(v) => serde_json::from_value::<PullNumber>(v.clone())
                .map_err(|_| ModelError::InvalidPullNumber(v.to_string()))?,
        };

        let filters = match raw.filters {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(ModelError::Invalid(format!(
                    "filters must be a string, got {other}"
                )));
            }
        };

        Ok(Self {
            repo,
            pull_number,
            filters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_trigger() {
        let t = BenchmarkTrigger::from_slice(
            br#"{"repo":"apache/arrow","pull_number":123,"filters":"lang=R"}"#,
        )
        .unwrap();

        assert_eq!(t.repo.as_str(), "apache/arrow");
        assert_eq!(t.pull_number.get(), 123);
        assert_eq!(t.filters, "lang=R");
    }

    #[test]
    fn filters_default_to_empty() {
        let t = BenchmarkTrigger::from_slice(br#"{"repo":"apache/arrow","pull_number":"7"}"#)
            .unwrap();
        assert_eq!(t.pull_number.get(), 7);
        assert!(t.filters.is_empty());
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let cases: [(&[u8], &str); 4] = [
            (br#"{"pull_number":1}"#, "repo"),
            (br#"{"repo":"","pull_number":1}"#, "repo"),
            (br#"{"repo":"apache/arrow"}"#, "pull_number"),
            (br#"{"repo":"apache/arrow","pull_number":null}"#, "pull_number"),
        ];

        for (body, field) in cases {
            match BenchmarkTrigger::from_slice(body) {
                Err(ModelError::MissingField(f)) => assert_eq!(f, field),
                other => panic!("expected MissingField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_object_and_bad_values() {
        assert!(BenchmarkTrigger::from_slice(b"not json").is_err());
        assert!(BenchmarkTrigger::from_slice(br#"{"repo":"arrow","pull_number":1}"#).is_err());
        assert!(
            BenchmarkTrigger::from_slice(br#"{"repo":"apache/arrow","pull_number":0}"#).is_err()
        );
        assert!(
            BenchmarkTrigger::from_slice(br#"{"repo":"apache/arrow","pull_number":1,"filters":3}"#)
                .is_err()
        );
    }
}
