//! Interaction request signature verification.
//!
//! Discord signs every interaction webhook with the application's Ed25519
//! key over `timestamp || body`:
//! <https://discord.com/developers/docs/interactions/overview#setting-up-an-endpoint-validating-security-request-headers>

use ed25519_dalek::{Signature, VerifyingKey};
use tracing::debug;

use super::error::DiscordError;

/// Header carrying the hex signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
/// Header carrying the signed timestamp.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Maximum accepted clock skew for request timestamps.
const MAX_SKEW_SECS: i64 = 300;

/// Verify an interaction request.
///
/// # Errors
///
/// Returns `DiscordError::InvalidSignature` if the timestamp is malformed or
/// outside the allowed window, or the signature does not match.
pub fn verify_signature(
    key: &VerifyingKey,
    timestamp: &str,
    body: &[u8],
    signature: &str,
) -> Result<(), DiscordError> {
    // Reject replays (5 minutes)
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| DiscordError::InvalidSignature("Invalid timestamp".to_string()))?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > MAX_SKEW_SECS {
        return Err(DiscordError::InvalidSignature(
            "Request timestamp too old".to_string(),
        ));
    }

    let bytes = hex::decode(signature)
        .map_err(|e| DiscordError::InvalidSignature(format!("Signature is not hex: {e}")))?;
    let bytes: [u8; 64] = bytes
        .try_into()
        .map_err(|_| DiscordError::InvalidSignature("Signature must be 64 bytes".to_string()))?;
    let signature = Signature::from_bytes(&bytes);

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    key.verify_strict(&message, &signature)
        .map_err(|_| DiscordError::InvalidSignature("Signature mismatch".to_string()))?;

    debug!("Discord signature verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7; 32])
    }

    fn sign(key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(key.sign(&message).to_bytes())
    }

    fn now() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    #[test]
    fn test_valid_signature() {
        let key = signing_key();
        let timestamp = now();
        let body = br#"{"type":1}"#;
        let signature = sign(&key, &timestamp, body);

        assert!(verify_signature(&key.verifying_key(), &timestamp, body, &signature).is_ok());
    }

    #[test]
    fn test_tampered_body() {
        let key = signing_key();
        let timestamp = now();
        let signature = sign(&key, &timestamp, br#"{"type":1}"#);

        let result = verify_signature(&key.verifying_key(), &timestamp, br#"{"type":2}"#, &signature);
        assert!(matches!(result, Err(DiscordError::InvalidSignature(_))));
    }

    #[test]
    fn test_old_timestamp() {
        let key = signing_key();
        let old = (chrono::Utc::now().timestamp() - 600).to_string();
        let body = b"{}";
        let signature = sign(&key, &old, body);

        let result = verify_signature(&key.verifying_key(), &old, body, &signature);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_inputs() {
        let key = signing_key().verifying_key();
        assert!(verify_signature(&key, "not-a-number", b"{}", "00").is_err());
        assert!(verify_signature(&key, &now(), b"{}", "zz").is_err());
        assert!(verify_signature(&key, &now(), b"{}", "abcd").is_err());
    }
}
