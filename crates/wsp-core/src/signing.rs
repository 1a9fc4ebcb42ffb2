//! HMAC-SHA256 signing shared by webhook delivery and WS-token issuance.
//!
//! Both call sites sign `{timestamp}.{payload}`-shaped strings over a secret only
//! they hold; centralizing the primitive keeps the signing input format and hex
//! encoding consistent across crates.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex-encoded HMAC-SHA256 of `message` under `secret`.
pub fn hmac_sha256_hex(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts a key of any length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded HMAC-SHA256 signature in constant time.
pub fn verify_hmac_sha256_hex(secret: &[u8], message: &[u8], signature_hex: &str) -> bool {
    let Ok(given) = hex::decode(signature_hex) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts a key of any length");
    mac.update(message);
    mac.verify_slice(&given).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let secret = b"shared-secret";
        let message = b"1700000000.{\"event\":\"append.created\"}";
        let signature = hmac_sha256_hex(secret, message);

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(verify_hmac_sha256_hex(secret, message, &signature));
    }

    #[test]
    fn verification_rejects_tampered_message() {
        let secret = b"shared-secret";
        let signature = hmac_sha256_hex(secret, b"original");
        assert!(!verify_hmac_sha256_hex(secret, b"tampered", &signature));
    }

    #[test]
    fn verification_rejects_wrong_secret() {
        let message = b"payload";
        let signature = hmac_sha256_hex(b"secret-a", message);
        assert!(!verify_hmac_sha256_hex(b"secret-b", message, &signature));
    }
}
