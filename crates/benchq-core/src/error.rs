use benchq_model::ModelError;
use thiserror::Error;

use crate::{
    baseline::BaselineError,
    command::CommandError,
    config::ConfigError,
    metrics::RequestOutcome,
    scheduler::{ScheduleConflict, ScheduleError},
    signature::SignatureError,
    store::StoreError,
};

/// Every way a request can end other than success.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    SignatureInvalid(#[from] SignatureError),

    #[error("Unsupported benchmark command")]
    UnsupportedBenchmarkCommand { reason: CommandError },

    #[error("{0}")]
    CommitHasScheduledBenchmarkRuns(ScheduleConflict),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status the outcome maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_)
            | ServiceError::Configuration(_)
            | ServiceError::UnsupportedBenchmarkCommand { .. } => 400,
            ServiceError::SignatureInvalid(_) => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::CommitHasScheduledBenchmarkRuns(_) => 409,
            ServiceError::Internal(_) => 500,
        }
    }

    pub fn outcome(&self) -> RequestOutcome {
        match self {
            ServiceError::BadRequest(_) | ServiceError::Configuration(_) | ServiceError::NotFound(_) => {
                RequestOutcome::BadRequest
            }
            ServiceError::SignatureInvalid(_) => RequestOutcome::Unauthorized,
            ServiceError::UnsupportedBenchmarkCommand { .. } => RequestOutcome::UnsupportedCommand,
            ServiceError::CommitHasScheduledBenchmarkRuns(_) => RequestOutcome::Conflict,
            ServiceError::Internal(_) => RequestOutcome::Internal,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        ServiceError::BadRequest(e.to_string())
    }
}

impl From<BaselineError> for ServiceError {
    fn from(e: BaselineError) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

impl From<ScheduleError> for ServiceError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::CommitHasScheduledBenchmarkRuns(c) => {
                ServiceError::CommitHasScheduledBenchmarkRuns(c)
            }
            ScheduleError::RunNotFound(id) => ServiceError::NotFound(format!("run {id} not found")),
            e @ (ScheduleError::InvalidTransition { .. } | ScheduleError::MissingBuildRef(_)) => {
                ServiceError::BadRequest(e.to_string())
            }
            e @ (ScheduleError::Trigger { .. } | ScheduleError::Dispatch(_) | ScheduleError::Store(_)) => {
                ServiceError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::commit;
    use benchq_model::{RunId, RunStatus};

    #[test]
    fn status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(ServiceError::SignatureInvalid(SignatureError::Mismatch).status_code(), 401);
        assert_eq!(
            ServiceError::UnsupportedBenchmarkCommand { reason: CommandError::HelpRequested }
                .status_code(),
            400
        );
        assert_eq!(
            ServiceError::CommitHasScheduledBenchmarkRuns(ScheduleConflict::new(vec![])).status_code(),
            409
        );
        assert_eq!(ServiceError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn schedule_errors_keep_their_class() {
        let conflict = ScheduleError::CommitHasScheduledBenchmarkRuns(ScheduleConflict::new(vec![(
            commit('a'),
            RunStatus::Created,
        )]));
        assert_eq!(ServiceError::from(conflict).status_code(), 409);

        let missing = ScheduleError::RunNotFound(RunId::new());
        assert_eq!(ServiceError::from(missing).status_code(), 404);

        let bad = ScheduleError::MissingBuildRef(RunStatus::Running);
        assert_eq!(ServiceError::from(bad).outcome(), RequestOutcome::BadRequest);

        let store = ScheduleError::Store(StoreError::Poisoned);
        assert_eq!(ServiceError::from(store).outcome(), RequestOutcome::Internal);
    }

    #[test]
    fn unsupported_command_message_is_fixed() {
        let e = ServiceError::UnsupportedBenchmarkCommand {
            reason: CommandError::UnknownKey("foo".into()),
        };
        assert_eq!(e.to_string(), "Unsupported benchmark command");
    }
}
