//! Filter specifications narrowing which benchmarks a run executes.
mod language;
pub use language::Language;

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Single predicate of a [`FilterSpec`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Benchmark is implemented in the given language.
    Lang(Language),
    /// Benchmark name contains the given substring.
    Name(String),
    /// Benchmark belongs to the given suite.
    Suite(String),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Lang(l) => write!(f, "lang={l}"),
            Predicate::Name(n) => write!(f, "name={n}"),
            Predicate::Suite(s) => write!(f, "suite={s}"),
        }
    }
}

/// What a predicate is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkDescriptor {
    pub name: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
}

/// Ordered set of predicates, combined with logical AND.
///
/// The empty specification is the wildcard: every benchmark matches.
/// Predicates are kept in canonical order, so two specifications built from
/// the same predicates in a different order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(BTreeSet<Predicate>);

impl FilterSpec {
    /// Wildcard specification.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a predicate, returning `self` for chaining.
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.0.insert(predicate);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.0.iter()
    }

    /// Returns `true` if the benchmark satisfies every predicate.
    pub fn matches(&self, bench: &BenchmarkDescriptor) -> bool {
        self.0.iter().all(|p| match p {
            Predicate::Lang(l) => bench.language == *l,
            Predicate::Name(n) => bench.name.contains(n.as_str()),
            Predicate::Suite(s) => bench.suite.as_deref() == Some(s.as_str()),
        })
    }
}

impl FromIterator<Predicate> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            return f.write_str("all benchmarks");
        }
        let mut first = true;
        for p in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{p}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench(name: &str, language: Language, suite: Option<&str>) -> BenchmarkDescriptor {
        BenchmarkDescriptor {
            name: name.to_string(),
            language,
            suite: suite.map(str::to_string),
        }
    }

    #[test]
    fn wildcard_matches_everything() {
        let spec = FilterSpec::all();
        assert!(spec.is_wildcard());
        assert!(spec.matches(&bench("file-write", Language::R, None)));
        assert_eq!(spec.to_string(), "all benchmarks");
    }

    #[test]
    fn predicates_combine_with_and() {
        let spec = FilterSpec::all()
            .with(Predicate::Lang(Language::Python))
            .with(Predicate::Name("file-".into()));

        assert!(spec.matches(&bench("file-write", Language::Python, None)));
        assert!(!spec.matches(&bench("file-write", Language::R, None)));
        assert!(!spec.matches(&bench("dataframe-to-table", Language::Python, None)));
    }

    #[test]
    fn suite_requires_exact_tag() {
        let spec = FilterSpec::all().with(Predicate::Suite("arrow-compute".into()));

        assert!(spec.matches(&bench("take", Language::Cpp, Some("arrow-compute"))));
        assert!(!spec.matches(&bench("take", Language::Cpp, Some("arrow-compute-x"))));
        assert!(!spec.matches(&bench("take", Language::Cpp, None)));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = FilterSpec::all()
            .with(Predicate::Name("csv".into()))
            .with(Predicate::Lang(Language::R));
        let b = FilterSpec::all()
            .with(Predicate::Lang(Language::R))
            .with(Predicate::Name("csv".into()));

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "lang=R name=csv");
    }

    #[test]
    fn serializes_as_tagged_array() {
        let spec = FilterSpec::all().with(Predicate::Lang(Language::Cpp));
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"[{"lang":"C++"}]"#);

        let back: FilterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
