//! Benchmark command parsing.
//!
//! Grammar (whitespace separated, case-insensitive trigger and keys):
//!
//! ```text
//! @<bot> please benchmark [token ...]
//! token := help | lang=<language> | name=<substring> | suite=<tag> | <substring>
//! ```
//!
//! Tokens are AND-ed. No tokens selects every benchmark. `lang` and `suite`
//! may appear at most once since repeating them can only match nothing.
mod error;
pub use error::CommandError;

use std::fmt::Write as _;

use benchq_model::{FilterSpec, Language, Predicate};

/// Default bot handle the trigger phrase is addressed to.
pub const DEFAULT_BOT_HANDLE: &str = "ursabot";

const TRIGGER_VERB: &str = "please benchmark";

/// Parses comment bodies addressed to the bot into filter specifications.
#[derive(Debug, Clone)]
pub struct CommandParser {
    handle: String,
    trigger: String,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(DEFAULT_BOT_HANDLE)
    }
}

impl CommandParser {
    /// Create a parser for `@<handle> please benchmark`. A leading `@` in
    /// `handle` is tolerated.
    pub fn new(handle: &str) -> Self {
        let handle = handle.trim().trim_start_matches('@').to_string();
        let trigger = format!("@{handle} {TRIGGER_VERB}");
        Self { handle, trigger }
    }

    /// Full trigger phrase, e.g. `@ursabot please benchmark`.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Build the comment a user would have written for a webhook `filters` string.
    pub fn compose(&self, filters: &str) -> String {
        let filters = filters.trim();
        if filters.is_empty() {
            self.trigger.clone()
        } else {
            format!("{} {filters}", self.trigger)
        }
    }

    /// Parse a comment body. Never panics; every input is either a spec or an error.
    pub fn parse(&self, text: &str) -> Result<FilterSpec, CommandError> {
        let text = text.trim_start();
        let rest = text
            .get(..self.trigger.len())
            .filter(|head| head.eq_ignore_ascii_case(&self.trigger))
            .map(|_| &text[self.trigger.len()..])
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            .ok_or_else(|| CommandError::MissingTrigger(self.trigger.clone()))?;

        let mut spec = FilterSpec::all();
        let mut seen_lang = false;
        let mut seen_suite = false;

        for token in rest.split_whitespace() {
            if token.eq_ignore_ascii_case("help") {
                return Err(CommandError::HelpRequested);
            }

            let Some((key, value)) = token.split_once('=') else {
                spec = spec.with(Predicate::Name(token.to_string()));
                continue;
            };
            if key.is_empty() || value.is_empty() {
                return Err(CommandError::Malformed(token.to_string()));
            }

            let predicate = match key.to_ascii_lowercase().as_str() {
                "lang" => {
                    if std::mem::replace(&mut seen_lang, true) {
                        return Err(CommandError::RepeatedKey("lang".into()));
                    }
                    let lang = value
                        .parse::<Language>()
                        .map_err(|_| CommandError::UnknownLanguage(value.to_string()))?;
                    Predicate::Lang(lang)
                }
                "suite" => {
                    if std::mem::replace(&mut seen_suite, true) {
                        return Err(CommandError::RepeatedKey("suite".into()));
                    }
                    Predicate::Suite(value.to_string())
                }
                "name" => Predicate::Name(value.to_string()),
                _ => return Err(CommandError::UnknownKey(key.to_string())),
            };
            spec = spec.with(predicate);
        }

        Ok(spec)
    }

    /// Canonical usage examples posted back when a command is rejected.
    pub fn usage(&self) -> String {
        let t = &self.trigger;
        let mut out = String::from("Supported benchmark command examples:\n\n");

        let _ = writeln!(out, "`{t} help`\n");
        let _ = writeln!(out, "To run all benchmarks:\n`{t}`\n");

        out.push_str("To filter benchmarks by language:\n");
        for lang in Language::ALL {
            let _ = writeln!(out, "`{t} lang={lang}`");
        }

        out.push_str("\nTo filter benchmarks by name (substring match):\n");
        let _ = writeln!(out, "`{t} name=file-write`");
        let _ = writeln!(out, "`{t} name=file-write lang=Python`");
        let _ = writeln!(out, "`{t} file-read`");

        out.push_str("\nTo filter benchmarks by suite:\n");
        let _ = writeln!(out, "`{t} suite=arrow-compute-vector-selection-benchmark`");

        let _ = write!(
            out,
            "\nFilters combine: a benchmark runs only if it matches all of them. \
             Commands must be addressed to @{}.",
            self.handle
        );
        out
    }
}
