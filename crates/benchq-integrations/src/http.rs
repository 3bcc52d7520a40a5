use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::IntegrationError;

const USER_AGENT: &str = concat!("benchq/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

pub(crate) fn client(timeout: Duration) -> Result<Client, IntegrationError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| IntegrationError::InvalidConfig(e.to_string()))
}

/// Fail non-2xx responses with their (truncated) body.
pub(crate) async fn check(service: &'static str, resp: Response) -> Result<Response, IntegrationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(IntegrationError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

pub(crate) async fn json<T: DeserializeOwned>(service: &'static str, resp: Response) -> Result<T, IntegrationError> {
    let bytes = check(service, resp).await?.bytes().await?;
    decode(service, &bytes)
}

pub(crate) fn decode<T: DeserializeOwned>(service: &'static str, bytes: &[u8]) -> Result<T, IntegrationError> {
    serde_json::from_slice(bytes).map_err(|e| IntegrationError::Decode {
        service,
        reason: e.to_string(),
    })
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_slashes() {
        assert_eq!(join("https://api.github.com/", "/repos/a/b"), "https://api.github.com/repos/a/b");
        assert_eq!(join("http://localhost:8080", "x"), "http://localhost:8080/x");
    }

    #[test]
    fn decode_reports_service() {
        let err = decode::<serde_json::Value>("github", b"not json").unwrap_err();
        assert!(matches!(err, IntegrationError::Decode { service: "github", .. }));
    }
}
