use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid repository identifier: {0} (expected owner/name)")]
    InvalidRepo(String),

    #[error("invalid commit identifier: {0}")]
    InvalidCommit(String),

    #[error("invalid pull number: {0}")]
    InvalidPullNumber(String),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("unknown run status: {0}")]
    UnknownRunStatus(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
