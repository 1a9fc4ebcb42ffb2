//! HTTP entry points that mint WS subscription tokens: the issuance side of
//! component G. These are the only capability-URL route bodies this crate
//! implements directly, since subscription-token minting is part of the
//! admission/distribution plane rather than a file-CRUD operation.
//!
//! `GET /{tier}/{key}/ops/subscribe` mints a workspace-scoped token.
//! `GET /{tier}/{key}/ops/folders/subscribe?path=...&recursive=...` mints one
//! scoped to a folder subtree.

use axum::Json;
use axum::extract::{Path, Query, State};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use wsp_postgres::query::CapabilityKeyRepository;
use wsp_postgres::types::CapabilityPermission;

use crate::admission::capability::{evaluate, tier_to_permission};
use crate::error::{Error, Result};
use crate::state::AppState;
use crate::ws::token::{TokenPayload, allowed_events, sign};

/// Subscription tokens expire 60 minutes after issue (§6).
fn token_ttl() -> jiff::Span {
    jiff::Span::new().minutes(60)
}

#[derive(Debug, Deserialize)]
pub struct FolderSubscribeQuery {
    path: String,
    #[serde(default = "default_recursive")]
    recursive: bool,
}

fn default_recursive() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct SubscribeBody {
    ok: bool,
    data: SubscribeData,
}

#[derive(Debug, Serialize)]
struct SubscribeData {
    #[serde(rename = "wsUrl")]
    ws_url: String,
    token: String,
    #[serde(rename = "expiresAt")]
    expires_at: String,
    events: Vec<&'static str>,
    #[serde(rename = "keyTier")]
    key_tier: CapabilityPermission,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recursive: Option<bool>,
}

/// `GET /{tier}/{key}/ops/subscribe`: mints a token scoped to the whole
/// workspace the key belongs to.
pub async fn subscribe_workspace(
    State(state): State<AppState>,
    Path((tier, key)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    mint(&state, &tier, &key, None, None).await
}

/// `GET /{tier}/{key}/ops/folders/subscribe?path=...&recursive=...`: mints a
/// token scoped to a folder subtree of the key's workspace.
pub async fn subscribe_folder(
    State(state): State<AppState>,
    Path((tier, key)): Path<(String, String)>,
    Query(query): Query<FolderSubscribeQuery>,
) -> Result<Json<serde_json::Value>> {
    mint(&state, &tier, &key, Some(query.path), Some(query.recursive)).await
}

async fn mint(
    state: &AppState,
    tier: &str,
    key: &str,
    scope: Option<String>,
    recursive: Option<bool>,
) -> Result<Json<serde_json::Value>> {
    if !wsp_core::capability::is_format_valid(key) {
        return Err(Error::not_found());
    }

    let Some(required) = tier_to_permission(tier) else {
        return Err(Error::not_found());
    };

    let hash = wsp_core::capability::hash_key(key);
    let mut conn = state.db.get_connection().await.map_err(Error::from)?;
    let record = conn
        .find_capability_key_by_hash(&hash)
        .await
        .map_err(Error::from)?;

    evaluate(record.as_ref(), tier, required, scope.as_deref())?;
    let record = record.expect("evaluate succeeded, so a record was found");

    // The token is scoped to the URL's tier, not the key's own permission: a
    // write key subscribing through a `/r/` URL gets read-tier visibility
    // only, matching what that URL grants on every other route.
    let payload = TokenPayload::new(
        record.workspace_id,
        required,
        hash,
        scope.clone(),
        token_ttl(),
    );
    let expires_at = Timestamp::from_second(payload.exp)
        .map_err(|err| Error::server_error(format!("invalid token expiry: {err}")))?;
    let token = sign(&payload, &state.ws_secret)?;

    let body = SubscribeBody {
        ok: true,
        data: SubscribeData {
            ws_url: format!("/ws?token={token}"),
            token,
            expires_at: expires_at.to_string(),
            events: allowed_events(required),
            key_tier: required,
            scope,
            recursive,
        },
    };

    Ok(Json(serde_json::to_value(body).map_err(|err| {
        Error::server_error(format!("failed to encode subscribe response: {err}"))
    })?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_query_defaults_recursive_true() {
        let query: FolderSubscribeQuery =
            serde_json::from_str(r#"{"path":"/notes"}"#).unwrap();
        assert!(query.recursive);
    }
}
