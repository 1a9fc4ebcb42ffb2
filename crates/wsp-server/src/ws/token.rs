//! WS-token service: signs, verifies, and single-use-consumes the bearer
//! tokens minted by the subscribe route and presented at the `/ws` upgrade.
//!
//! A token is three base64url segments joined by dots: `header.payload.signature`,
//! mirroring the shape of a JWT without pulling in a JWT crate — the payload is
//! fixed-shape and internal to this service, so the extra surface area (key IDs,
//! algorithm negotiation) a general JWT library brings is not needed here.

use std::collections::HashSet;
use std::sync::Mutex;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;
use wsp_postgres::types::CapabilityPermission;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const HEADER_SEGMENT: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IldTVCJ9";

/// Events visible to a `read`-tier subscriber.
pub const EVENTS_READ: &[&str] = &["append", "file.created", "file.deleted", "file.updated"];

/// Events visible to an `append`-tier subscriber: [`EVENTS_READ`] plus these.
pub const EVENTS_APPEND_EXTRA: &[&str] =
    &["task.created", "task.blocked", "claim.expired", "heartbeat"];

/// Events visible to a `write`-tier subscriber: the append set plus these.
pub const EVENTS_WRITE_EXTRA: &[&str] = &["webhook.failed", "settings.changed"];

/// WS close code sent when a presented token's `exp` has passed.
pub const CLOSE_TOKEN_EXPIRED: u16 = 4001;
/// WS close code sent when a presented token fails signature or shape checks.
pub const CLOSE_TOKEN_INVALID: u16 = 4002;
/// WS close code sent when the capability key bound to the token was revoked.
pub const CLOSE_KEY_REVOKED: u16 = 4003;

/// Returns the exact event list a subscriber at `tier` may receive.
pub fn allowed_events(tier: CapabilityPermission) -> Vec<&'static str> {
    let mut events: Vec<&'static str> = EVENTS_READ.to_vec();
    if tier >= CapabilityPermission::Append {
        events.extend_from_slice(EVENTS_APPEND_EXTRA);
    }
    if tier >= CapabilityPermission::Write {
        events.extend_from_slice(EVENTS_WRITE_EXTRA);
    }
    events
}

/// The signed payload carried by a WS subscription token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    pub workspace_id: Uuid,
    pub key_tier: CapabilityPermission,
    /// Binds the token to the exact capability record it was minted for.
    pub key_hash: String,
    /// Seconds-epoch expiry.
    pub exp: i64,
    pub scope: Option<String>,
    pub nonce: String,
}

impl TokenPayload {
    /// Creates a new payload expiring `ttl` from now, with a fresh random nonce.
    pub fn new(
        workspace_id: Uuid,
        key_tier: CapabilityPermission,
        key_hash: impl Into<String>,
        scope: Option<String>,
        ttl: jiff::Span,
    ) -> Self {
        let exp = (Timestamp::now() + ttl).as_second();
        Self {
            workspace_id,
            key_tier,
            key_hash: key_hash.into(),
            exp,
            scope,
            nonce: wsp_core::capability::generate_key(24),
        }
    }

    fn is_expired(&self, now: Timestamp) -> bool {
        self.exp <= now.as_second()
    }
}

/// Signs `payload` into a three-segment `header.payload.signature` token.
pub fn sign(payload: &TokenPayload, secret: &[u8]) -> Result<String> {
    let payload_json = serde_json::to_vec(payload)
        .map_err(|err| Error::server_error(format!("failed to encode WS-token payload: {err}")))?;
    let payload_segment = BASE64_URL_SAFE_NO_PAD.encode(payload_json);

    let signing_input = format!("{HEADER_SEGMENT}.{payload_segment}");
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| Error::server_error("WS-token secret is invalid for HMAC-SHA256"))?;
    mac.update(signing_input.as_bytes());
    let signature_segment = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature_segment}"))
}

/// Verifies `token`'s signature and structure and checks that it has not
/// expired. Does not consult the single-use nonce store; call [`NonceStore::consume`]
/// separately once the caller has otherwise committed to honoring the token.
pub fn verify(token: &str, secret: &[u8]) -> Result<TokenPayload> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload_segment), Some(signature_segment), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(Error::token_invalid());
    };

    if header != HEADER_SEGMENT {
        return Err(Error::token_invalid());
    }

    let signing_input = format!("{header}.{payload_segment}");
    let given_signature = BASE64_URL_SAFE_NO_PAD
        .decode(signature_segment)
        .map_err(|_| Error::token_invalid())?;

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| Error::token_invalid())?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&given_signature)
        .map_err(|_| Error::token_invalid())?;

    let payload_bytes = BASE64_URL_SAFE_NO_PAD
        .decode(payload_segment)
        .map_err(|_| Error::token_invalid())?;
    let payload: TokenPayload =
        serde_json::from_slice(&payload_bytes).map_err(|_| Error::token_invalid())?;

    if payload.is_expired(Timestamp::now()) {
        return Err(Error::token_expired());
    }

    Ok(payload)
}

/// In-process record of nonces consumed by a successful `/ws` upgrade.
///
/// A process restart clears this set; the token's `exp` bounds how long that
/// matters for, so replay is possible only within the remaining token
/// lifetime of a crash-restart window.
#[derive(Default)]
pub struct NonceStore {
    consumed: Mutex<HashSet<String>>,
}

impl NonceStore {
    /// Creates an empty nonce store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `nonce` as used. Returns [`Error::token_already_used`] if it
    /// had already been consumed.
    pub fn consume(&self, nonce: &str) -> Result<()> {
        let mut consumed = self.consumed.lock().expect("nonce store mutex poisoned");
        if !consumed.insert(nonce.to_owned()) {
            return Err(Error::token_already_used());
        }
        Ok(())
    }
}

impl std::fmt::Debug for NonceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.consumed.lock().map(|set| set.len()).unwrap_or(0);
        f.debug_struct("NonceStore").field("consumed", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> TokenPayload {
        TokenPayload::new(
            Uuid::now_v7(),
            CapabilityPermission::Append,
            "deadbeef",
            Some("/notes".to_owned()),
            jiff::Span::new().minutes(5),
        )
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let secret = b"test-secret";
        let original = payload();
        let token = sign(&original, secret).unwrap();
        let verified = verify(&token, secret).unwrap();
        assert_eq!(verified.nonce, original.nonce);
        assert_eq!(verified.workspace_id, original.workspace_id);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = sign(&payload(), b"secret-a").unwrap();
        let err = verify(&token, b"secret-b").unwrap_err();
        assert_eq!(err.kind().code(), "TOKEN_INVALID");
    }

    #[test]
    fn verify_rejects_malformed_segments() {
        let err = verify("not.a.valid.token", b"secret").unwrap_err();
        assert_eq!(err.kind().code(), "TOKEN_INVALID");

        let err = verify("onlyonesegment", b"secret").unwrap_err();
        assert_eq!(err.kind().code(), "TOKEN_INVALID");
    }

    #[test]
    fn verify_rejects_expired_token() {
        let mut expired = payload();
        expired.exp = Timestamp::now().as_second() - 10;
        let token = sign(&expired, b"secret").unwrap();
        let err = verify(&token, b"secret").unwrap_err();
        assert_eq!(err.kind().code(), "TOKEN_EXPIRED");
    }

    #[test]
    fn nonce_store_rejects_second_consume() {
        let store = NonceStore::new();
        store.consume("nonce-1").unwrap();
        let err = store.consume("nonce-1").unwrap_err();
        assert_eq!(err.kind().code(), "TOKEN_ALREADY_USED");
    }

    #[test]
    fn allowed_events_escalate_with_tier() {
        let read = allowed_events(CapabilityPermission::Read);
        assert_eq!(read.len(), EVENTS_READ.len());

        let append = allowed_events(CapabilityPermission::Append);
        assert_eq!(append.len(), EVENTS_READ.len() + EVENTS_APPEND_EXTRA.len());

        let write = allowed_events(CapabilityPermission::Write);
        assert_eq!(
            write.len(),
            EVENTS_READ.len() + EVENTS_APPEND_EXTRA.len() + EVENTS_WRITE_EXTRA.len()
        );
    }
}
