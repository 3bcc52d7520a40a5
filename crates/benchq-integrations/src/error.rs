use benchq_core::clients::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected {service} response: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },
}

impl From<IntegrationError> for ClientError {
    fn from(e: IntegrationError) -> Self {
        match e {
            IntegrationError::Status {
                status: 404, body, ..
            } => ClientError::NotFound(body),
            IntegrationError::Status { status, body, .. } => ClientError::Rejected {
                status,
                message: body,
            },
            IntegrationError::Decode { .. } => ClientError::Decode(e.to_string()),
            IntegrationError::Http(_) | IntegrationError::InvalidConfig(_) => {
                ClientError::Transport(e.to_string())
            }
        }
    }
}
