//! Webhook signature verification.
//!
//! The sender signs the exact request body with HMAC and puts
//! `<scheme>=<hex digest>` in a header (`X-Hub-Signature-256: sha256=...`,
//! legacy `X-Hub-Signature: sha1=...`). Verification always runs over the raw
//! body bytes; a re-serialized JSON value is not byte-identical and would
//! fail.
mod error;
pub use error::SignatureError;

use std::{fmt, str::FromStr};

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

/// Header carrying the SHA-256 signature.
pub const SIGNATURE_256_HEADER: &str = "x-hub-signature-256";
/// Legacy header carrying the SHA-1 signature.
pub const SIGNATURE_SHA1_HEADER: &str = "x-hub-signature";

/// HMAC algorithm declared by the signature header prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    Sha1,
    Sha256,
}

impl SignatureScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::Sha1 => "sha1",
            SignatureScheme::Sha256 => "sha256",
        }
    }

    /// Digest length in bytes.
    const fn digest_len(&self) -> usize {
        match self {
            SignatureScheme::Sha1 => 20,
            SignatureScheme::Sha256 => 32,
        }
    }
}

impl FromStr for SignatureScheme {
    type Err = SignatureError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(SignatureScheme::Sha1),
            "sha256" => Ok(SignatureScheme::Sha256),
            other => Err(SignatureError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verify `header` (e.g. `sha256=ab12...`) against `payload` signed with `secret`.
///
/// The digest comparison is constant-time (`Mac::verify_slice`).
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &[u8],
) -> Result<(), SignatureError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SignatureError::MissingHeader)?;

    let (scheme, digest_hex) = header
        .split_once('=')
        .ok_or_else(|| SignatureError::Malformed("expected <scheme>=<hex digest>".into()))?;
    let scheme: SignatureScheme = scheme.parse()?;

    let expected = hex::decode(digest_hex.trim())
        .map_err(|e| SignatureError::Malformed(format!("digest is not hex: {e}")))?;
    if expected.len() != scheme.digest_len() {
        return Err(SignatureError::Malformed(format!(
            "{scheme} digest must be {} bytes, got {}",
            scheme.digest_len(),
            expected.len()
        )));
    }

    let verified = match scheme {
        SignatureScheme::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(secret)
                .map_err(|_| SignatureError::InvalidSecret)?;
            mac.update(payload);
            mac.verify_slice(&expected)
        }
        SignatureScheme::Sha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                .map_err(|_| SignatureError::InvalidSecret)?;
            mac.update(payload);
            mac.verify_slice(&expected)
        }
    };
    verified.map_err(|_| SignatureError::Mismatch)
}

/// Produce the header value a sender would attach to `payload`.
pub fn sign(payload: &[u8], secret: &[u8], scheme: SignatureScheme) -> Result<String, SignatureError> {
    let digest = match scheme {
        SignatureScheme::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(secret)
                .map_err(|_| SignatureError::InvalidSecret)?;
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
        SignatureScheme::Sha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                .map_err(|_| SignatureError::InvalidSecret)?;
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(format!("{scheme}={}", hex::encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"It's a Secret to Everybody";
    const PAYLOAD: &[u8] = b"Hello, World!";

    #[test]
    fn matches_published_sha256_vector() {
        // Reference vector from GitHub's webhook validation docs.
        let header = "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17";
        assert!(verify_signature(PAYLOAD, Some(header), SECRET).is_ok());
    }

    #[test]
    fn sign_then_verify_for_both_schemes() {
        for scheme in [SignatureScheme::Sha1, SignatureScheme::Sha256] {
            let header = sign(PAYLOAD, SECRET, scheme).unwrap();
            assert!(header.starts_with(scheme.as_str()));
            verify_signature(PAYLOAD, Some(&header), SECRET)
                .unwrap_or_else(|e| panic!("{scheme} should verify: {e}"));
        }
    }

    #[test]
    fn tampered_payload_fails_for_every_byte() {
        let header = sign(PAYLOAD, SECRET, SignatureScheme::Sha256).unwrap();

        for i in 0..PAYLOAD.len() {
            let mut tampered = PAYLOAD.to_vec();
            tampered[i] ^= 0x01;
            assert!(matches!(
                verify_signature(&tampered, Some(&header), SECRET),
                Err(SignatureError::Mismatch)
            ));
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let header = sign(PAYLOAD, SECRET, SignatureScheme::Sha256).unwrap();
        assert!(matches!(
            verify_signature(PAYLOAD, Some(&header), b"not the secret"),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn missing_header_is_reported() {
        assert!(matches!(
            verify_signature(PAYLOAD, None, SECRET),
            Err(SignatureError::MissingHeader)
        ));
        assert!(matches!(
            verify_signature(PAYLOAD, Some("   "), SECRET),
            Err(SignatureError::MissingHeader)
        ));
    }

    #[test]
    fn unsupported_scheme_is_reported() {
        let err = verify_signature(PAYLOAD, Some("md5=abcd"), SECRET).unwrap_err();
        assert!(matches!(err, SignatureError::UnsupportedScheme(ref s) if s == "md5"));
    }

    #[test]
    fn malformed_digest_is_reported() {
        for header in ["sha256", "sha256=zz", "sha256=abcd", "sha1=00"] {
            assert!(
                matches!(
                    verify_signature(PAYLOAD, Some(header), SECRET),
                    Err(SignatureError::Malformed(_))
                ),
                "expected Malformed for {header:?}"
            );
        }
    }

    #[test]
    fn scheme_prefix_is_case_insensitive() {
        let header = sign(PAYLOAD, SECRET, SignatureScheme::Sha256)
            .unwrap()
            .replacen("sha256", "SHA256", 1);
        assert!(verify_signature(PAYLOAD, Some(&header), SECRET).is_ok());
    }
}
