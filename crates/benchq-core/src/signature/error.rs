use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature header is missing")]
    MissingHeader,

    #[error("unsupported signature scheme: {0} (expected sha256 or sha1)")]
    UnsupportedScheme(String),

    #[error("malformed signature: {0}")]
    Malformed(String),

    #[error("signature secret cannot be used as an HMAC key")]
    InvalidSecret,

    #[error("signature does not match payload")]
    Mismatch,
}
