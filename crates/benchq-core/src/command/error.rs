use thiserror::Error;

/// Why a comment was not accepted as a benchmark command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("comment does not start with `{0}`")]
    MissingTrigger(String),

    #[error("help requested")]
    HelpRequested,

    #[error("unknown filter key `{0}` (expected lang, name or suite)")]
    UnknownKey(String),

    #[error("malformed filter `{0}` (expected key=value)")]
    Malformed(String),

    #[error("unknown language `{0}`")]
    UnknownLanguage(String),

    #[error("filter key `{0}` given more than once")]
    RepeatedKey(String),
}
