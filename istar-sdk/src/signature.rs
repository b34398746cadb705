//! Signature and API-key checks for the gateway.
//!
//! Webhook deliveries and signed requests carry a hex-encoded
//! HMAC-SHA256 of the exact raw body:
//!
//! ```text
//! X-iStar-Signature: hex(HMAC-SHA256(body, secret))
//! ```
//!
//! Callers of the REST API authenticate with a shared key in the
//! `API-Key` header, the same header the gateway itself sends upstream.

/// Header name for the webhook body signature.
pub const SIGNATURE_HEADER: &str = "X-iStar-Signature";

/// Header name carrying the shared API key.
pub const API_KEY_HEADER: &str = "API-Key";

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature")]
    Missing,
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

fn hmac_key(secret: &[u8]) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret)
}

/// Sign a raw body: `hex(HMAC-SHA256(body, secret))`.
pub fn sign_body(body: &[u8], secret: &[u8]) -> String {
    let tag = ring::hmac::sign(&hmac_key(secret), body);
    hex::encode(tag.as_ref())
}

/// Verify a hex signature over the exact raw body.
///
/// The tag comparison is constant time (delegated to `ring`).
pub fn verify_body(body: &[u8], signature: &str, secret: &[u8]) -> Result<(), SignatureError> {
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(SignatureError::Missing);
    }
    let signature_bytes = hex::decode(signature).map_err(|_| SignatureError::InvalidHex)?;
    ring::hmac::verify(&hmac_key(secret), body, &signature_bytes)?;
    Ok(())
}

/// Compare a caller-supplied API key against the configured one.
///
/// Surrounding whitespace on the supplied key is ignored. An empty key on
/// either side never matches. Keys of different length are rejected before
/// the byte comparison, so only equal-length inputs are compared in
/// constant time.
pub fn verify_api_key(provided: &str, expected: &str) -> bool {
    let provided = provided.trim();
    if provided.is_empty() || expected.is_empty() {
        return false;
    }
    constant_time_eq(provided.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (&x, &y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }

    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"webhook-secret";

    #[test]
    fn test_sign_and_verify() {
        let body = br#"{"order":{"id":"x","status":"completed"}}"#;
        let signature = sign_body(body, SECRET);
        assert_eq!(signature.len(), 64);
        assert!(verify_body(body, &signature, SECRET).is_ok());
        assert!(verify_body(body, &signature.to_uppercase(), SECRET).is_ok());
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let signature = sign_body(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_tampered_body_never_verifies() {
        let body = br#"{"order":{"id":"x","status":"completed"},"tx_hash":"0xabc"}"#.to_vec();
        let original = sign_body(&body, SECRET);
        for index in 0..body.len() {
            let mut tampered = body.clone();
            tampered[index] ^= 0x01;
            let tampered_signature = sign_body(&tampered, SECRET);
            assert_eq!(
                verify_body(&body, &tampered_signature, SECRET),
                Err(SignatureError::SignatureMismatch)
            );
            assert_eq!(
                verify_body(&tampered, &original, SECRET),
                Err(SignatureError::SignatureMismatch)
            );
        }
    }

    #[test]
    fn test_wrong_secret_or_encoding() {
        let body = b"{}";
        let signature = sign_body(body, SECRET);
        assert_eq!(
            verify_body(body, &signature, b"other-secret"),
            Err(SignatureError::SignatureMismatch)
        );
        assert_eq!(
            verify_body(body, "not-hex", SECRET),
            Err(SignatureError::InvalidHex)
        );
        assert_eq!(verify_body(body, "  ", SECRET), Err(SignatureError::Missing));
    }

    #[test]
    fn test_api_key_comparison() {
        assert!(verify_api_key("s3cret-key", "s3cret-key"));
        assert!(verify_api_key("  s3cret-key\t", "s3cret-key"));
        assert!(!verify_api_key("", "s3cret-key"));
        assert!(!verify_api_key("   ", "s3cret-key"));
        assert!(!verify_api_key("s3cret-key", ""));
        assert!(!verify_api_key("s3cret-ke", "s3cret-key"));
    }

    #[test]
    fn test_api_key_rejects_any_single_character_difference() {
        let expected = "abcdefghijklmnop";
        for index in 0..expected.len() {
            let mut altered = expected.as_bytes().to_vec();
            altered[index] = if altered[index] == b'z' { b'y' } else { b'z' };
            let altered = String::from_utf8(altered).unwrap();
            assert!(!verify_api_key(&altered, expected));
        }
    }
}
