use std::collections::BTreeMap;

use benchq_model::{Benchmarkable, BuildRef, Run};
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// `POST .../builds` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBuild {
    pub commit: String,
    pub branch: String,
    pub message: String,
    pub env: BTreeMap<String, String>,
}

impl CreateBuild {
    /// Build request for `run`. The filter specification travels as JSON in
    /// `BENCHQ_FILTERS` so the pipeline can select benchmarks itself.
    pub fn for_run(run: &Run, target: &Benchmarkable, branch: &str) -> Self {
        let filters = serde_json::to_string(&run.filters).unwrap_or_else(|_| "[]".to_string());
        let env = BTreeMap::from([
            ("BENCHQ_RUN_ID".to_string(), run.id.to_string()),
            ("BENCHQ_REPO".to_string(), target.repo.to_string()),
            ("BENCHQ_FILTERS".to_string(), filters),
        ]);
        Self {
            commit: target.id().to_string(),
            branch: branch.to_string(),
            message: format!("Benchmark {} ({})", target.id().short(), run.filters),
            env,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Build {
    pub id: String,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl Build {
    /// Prefer the dashboard URL, fall back to the build id.
    pub fn into_ref(self) -> Result<BuildRef, IntegrationError> {
        self.web_url
            .and_then(BuildRef::new)
            .or_else(|| BuildRef::new(self.id))
            .ok_or_else(|| IntegrationError::Decode {
                service: "buildkite",
                reason: "build has neither web_url nor id".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::decode;
    use benchq_model::{CommitId, FilterSpec, Language, Predicate, RepoId};

    fn target() -> Benchmarkable {
        Benchmarkable::new(
            "apache/arrow".parse::<RepoId>().unwrap(),
            CommitId::new("a".repeat(40)).unwrap(),
        )
    }

    #[test]
    fn request_carries_run_context() {
        let t = target();
        let filters = FilterSpec::all().with(Predicate::Lang(Language::Python));
        let run = Run::created(t.repo.clone(), t.id().clone(), filters);

        let body = CreateBuild::for_run(&run, &t, "main");

        assert_eq!(body.commit, "a".repeat(40));
        assert_eq!(body.branch, "main");
        assert_eq!(body.env["BENCHQ_RUN_ID"], run.id.to_string());
        assert_eq!(body.env["BENCHQ_REPO"], "apache/arrow");
        assert_eq!(body.env["BENCHQ_FILTERS"], r#"[{"lang":"Python"}]"#);
        assert!(body.message.contains("lang=Python"));
    }

    #[test]
    fn build_ref_prefers_web_url() {
        let b: Build = decode(
            "buildkite",
            br#"{"id":"f62a1b4d","number":42,"web_url":"https://buildkite.com/apache-arrow/bench/builds/42"}"#,
        )
        .unwrap();
        assert_eq!(
            b.into_ref().unwrap().as_str(),
            "https://buildkite.com/apache-arrow/bench/builds/42"
        );

        let b: Build = decode("buildkite", br#"{"id":"f62a1b4d"}"#).unwrap();
        assert_eq!(b.into_ref().unwrap().as_str(), "f62a1b4d");

        let b: Build = decode("buildkite", br#"{"id":"","web_url":""}"#).unwrap();
        assert!(b.into_ref().is_err());
    }
}
