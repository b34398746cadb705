//! Inbound webhook verification settings.

use istar_sdk::signature::{SignatureError, verify_body};

/// How provider webhook deliveries are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum WebhookVerification {
    /// HMAC-SHA256 over the raw body, hex-encoded in `X-iStar-Signature`.
    Hmac { secret: String },
    /// Accept every delivery. Only reachable through an explicit
    /// `mode = "disabled"` in the config file.
    Disabled,
}

impl WebhookVerification {
    pub fn is_enabled(&self) -> bool {
        matches!(self, WebhookVerification::Hmac { .. })
    }

    /// Check a delivery against the configured mode.
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), SignatureError> {
        match self {
            WebhookVerification::Hmac { secret } => {
                let signature = signature.ok_or(SignatureError::Missing)?;
                verify_body(body, signature, secret.as_bytes())
            }
            WebhookVerification::Disabled => Ok(()),
        }
    }
}

impl std::fmt::Debug for WebhookVerification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookVerification::Hmac { .. } => f
                .debug_struct("Hmac")
                .field("secret", &"<redacted>")
                .finish(),
            WebhookVerification::Disabled => f.write_str("Disabled"),
        }
    }
}
