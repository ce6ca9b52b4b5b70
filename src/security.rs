use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Webhook Signatures
// =============================================================================

/// Why a payment provider webhook was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Malformed signature header")]
    MalformedHeader,
    #[error("Signature timestamp outside tolerance")]
    StaleTimestamp,
    #[error("No signature matches the payload")]
    Mismatch,
}

/// Parsed `Stripe-Signature` header: `t=<unix>,v1=<hex>[,v1=<hex>...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Every `v1` signature; the provider may send several during secret rotation
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for pair in header.split(',') {
            let Some((key, value)) = pair.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => {
                    timestamp = Some(
                        value
                            .parse::<i64>()
                            .map_err(|_| SignatureError::MalformedHeader)?,
                    )
                }
                "v1" => signatures.push(value.to_string()),
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
        if signatures.is_empty() {
            return Err(SignatureError::MalformedHeader);
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Verify HMAC-SHA256 signature
///
/// # Arguments
/// * `data` - The data that was signed
/// * `signature` - The hex-encoded HMAC signature
/// * `secret` - The shared secret key (from environment)
///
/// Comparison is constant-time.
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Hex HMAC-SHA256 of `data`; used to sign test payloads
pub fn sign_hmac(data: &str, secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Validate timestamp is within acceptable range
///
/// Prevents replay attacks by ensuring the request is recent.
///
/// # Arguments
/// * `timestamp` - Unix timestamp in seconds from the signature header
/// * `now` - Current Unix timestamp in seconds
/// * `max_age_secs` - Maximum age allowed in seconds
pub fn validate_timestamp(timestamp: i64, now: i64, max_age_secs: i64) -> bool {
    let age_seconds = now.saturating_sub(timestamp).saturating_abs();

    if age_seconds > max_age_secs {
        tracing::warn!(
            "Timestamp too old: {} seconds (max: {})",
            age_seconds,
            max_age_secs
        );
        return false;
    }

    true
}

/// Check a webhook body against its signature header.
///
/// The signed string is `"{timestamp}.{body}"`.
pub fn verify_webhook_signature(
    body: &str,
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let parsed = SignatureHeader::parse(header)?;

    let signed_payload = format!("{}.{}", parsed.timestamp, body);
    let matches = parsed
        .signatures
        .iter()
        .any(|sig| verify_hmac(&signed_payload, sig, secret));
    if !matches {
        return Err(SignatureError::Mismatch);
    }

    if !validate_timestamp(parsed.timestamp, now, tolerance_secs) {
        return Err(SignatureError::StaleTimestamp);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;

    fn header_for(body: &str, timestamp: i64, secret: &str) -> String {
        let sig = sign_hmac(&format!("{}.{}", timestamp, body), secret);
        format!("t={},v1={}", timestamp, sig)
    }

    // =========================================================================
    // HMAC Tests
    // =========================================================================

    #[test]
    fn test_verify_hmac_valid() {
        let data = "test data";
        let signature = sign_hmac(data, "secret");
        assert_eq!(signature.len(), 64);
        assert!(verify_hmac(data, &signature, "secret"));
    }

    #[test]
    fn test_verify_hmac_invalid_signature() {
        assert!(!verify_hmac("test data", &"0".repeat(64), "secret"));
    }

    #[test]
    fn test_verify_hmac_wrong_secret() {
        let signature = sign_hmac("test data", "secret");
        assert!(!verify_hmac("test data", &signature, "wrong-secret"));
    }

    #[test]
    fn test_verify_hmac_invalid_hex() {
        assert!(!verify_hmac("test data", "not-valid-hex!", "secret"));
    }

    #[test]
    fn test_verify_hmac_tampered_data() {
        let signature = sign_hmac("original data", "secret");
        assert!(!verify_hmac("tampered data", &signature, "secret"));
    }

    // =========================================================================
    // Timestamp Tests
    // =========================================================================

    #[test]
    fn test_validate_timestamp_current() {
        assert!(validate_timestamp(NOW, NOW, 300));
    }

    #[test]
    fn test_validate_timestamp_within_range() {
        assert!(validate_timestamp(NOW - 299, NOW, 300));
        assert!(validate_timestamp(NOW - 300, NOW, 300));
    }

    #[test]
    fn test_validate_timestamp_too_old() {
        assert!(!validate_timestamp(NOW - 301, NOW, 300));
    }

    #[test]
    fn test_validate_timestamp_future() {
        assert!(validate_timestamp(NOW + 60, NOW, 300));
        assert!(!validate_timestamp(NOW + 600, NOW, 300));
    }

    // =========================================================================
    // Header + Webhook Tests
    // =========================================================================

    #[test]
    fn test_parse_header() {
        let parsed = SignatureHeader::parse("t=123,v1=abc,v0=ignored,v1=def").unwrap();
        assert_eq!(parsed.timestamp, 123);
        assert_eq!(parsed.signatures, vec!["abc", "def"]);
    }

    #[test]
    fn test_parse_header_malformed() {
        for header in ["", "v1=abc", "t=123", "t=abc,v1=def", "garbage"] {
            assert_eq!(
                SignatureHeader::parse(header),
                Err(SignatureError::MalformedHeader),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_verify_webhook_signature_valid() {
        let body = r#"{"id":"evt_1","type":"customer.subscription.deleted"}"#;
        let header = header_for(body, NOW - 10, SECRET);
        assert_eq!(verify_webhook_signature(body, &header, SECRET, NOW, 300), Ok(()));
    }

    #[test]
    fn test_verify_webhook_signature_second_v1_matches() {
        let body = "{}";
        let good = sign_hmac(&format!("{}.{}", NOW, body), SECRET);
        let header = format!("t={},v1={},v1={}", NOW, "0".repeat(64), good);
        assert_eq!(verify_webhook_signature(body, &header, SECRET, NOW, 300), Ok(()));
    }

    #[test]
    fn test_verify_webhook_signature_wrong_secret() {
        let body = "{}";
        let header = header_for(body, NOW, "whsec_other");
        assert_eq!(
            verify_webhook_signature(body, &header, SECRET, NOW, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_verify_webhook_signature_modified_body() {
        let header = header_for(r#"{"amount":1}"#, NOW, SECRET);
        assert_eq!(
            verify_webhook_signature(r#"{"amount":2}"#, &header, SECRET, NOW, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_verify_webhook_signature_replayed() {
        let body = "{}";
        let header = header_for(body, NOW - 3600, SECRET);
        assert_eq!(
            verify_webhook_signature(body, &header, SECRET, NOW, 300),
            Err(SignatureError::StaleTimestamp)
        );
    }
}
