//! Capability-key evaluator: given a key record (or its absence) and the
//! route's required permission and path, decides allow/deny.
//!
//! Every rejection surfaces the uniform `NOT_FOUND` body except revocation —
//! callers must never branch on the internal cause before mapping to a
//! response, so a capability URL can never be distinguished from "does not
//! exist" by an attacker probing for live keys.

use wsp_postgres::model::CapabilityKey;
use wsp_postgres::types::CapabilityPermission;

use crate::error::Error;

/// Parses the URL tier segment (`r`, `a`, or `w`) into its minimum required
/// permission. Returns `None` for anything else, which callers treat as a
/// malformed capability path (also a 404, per the uniform-rejection rule).
pub fn tier_to_permission(tier: &str) -> Option<CapabilityPermission> {
    match tier {
        "r" => Some(CapabilityPermission::Read),
        "a" => Some(CapabilityPermission::Append),
        "w" => Some(CapabilityPermission::Write),
        _ => None,
    }
}

/// Evaluates whether `key` (already looked up by hash; `None` if no row
/// matched) may serve a request requiring `required` permission at
/// `requested_path` under the URL `tier`.
///
/// Rule order mirrors the exact precedence required for uniform rejection:
/// existence, revocation, expiry, tier, permission, then scope.
pub fn evaluate(
    key: Option<&CapabilityKey>,
    tier: &str,
    required: CapabilityPermission,
    requested_path: Option<&str>,
) -> Result<(), Error> {
    let Some(key) = key else {
        return Err(Error::not_found());
    };

    if key.is_revoked() {
        return Err(Error::key_revoked());
    }

    if key.is_expired() {
        return Err(Error::not_found());
    }

    let Some(tier_permission) = tier_to_permission(tier) else {
        return Err(Error::not_found());
    };

    if !key.satisfies(tier_permission) {
        return Err(Error::not_found());
    }

    if !key.satisfies(required) {
        return Err(Error::not_found());
    }

    if !scope_matches(key, requested_path) {
        return Err(Error::not_found());
    }

    Ok(())
}

fn scope_matches(key: &CapabilityKey, requested_path: Option<&str>) -> bool {
    use wsp_postgres::types::CapabilityScopeType;

    match key.scope_type {
        CapabilityScopeType::Workspace => true,
        CapabilityScopeType::File => match (&key.scope_path, requested_path) {
            (Some(scope), Some(path)) => scope == path,
            _ => false,
        },
        CapabilityScopeType::Folder => match (&key.scope_path, requested_path) {
            (Some(scope), Some(path)) => {
                path == scope.as_str() || path.strip_prefix(scope.as_str()).is_some_and(|rest| rest.starts_with('/'))
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;
    use jiff_diesel::Timestamp as DbTimestamp;
    use uuid::Uuid;
    use wsp_postgres::types::CapabilityScopeType;

    fn key(
        permission: CapabilityPermission,
        scope_type: CapabilityScopeType,
        scope_path: Option<&str>,
    ) -> CapabilityKey {
        CapabilityKey {
            id: Uuid::nil(),
            workspace_id: Uuid::nil(),
            prefix: "abcdef".into(),
            key_hash: "hash".into(),
            permission,
            scope_type,
            scope_path: scope_path.map(str::to_owned),
            bound_author: None,
            wip_limit: None,
            allowed_types: None,
            display_name: None,
            created_at: Timestamp::now().into(),
            expires_at: None,
            revoked_at: None,
        }
    }

    #[test]
    fn missing_key_is_not_found() {
        let err = evaluate(None, "r", CapabilityPermission::Read, None).unwrap_err();
        assert_eq!(err.kind().code(), "NOT_FOUND");
    }

    #[test]
    fn revoked_key_is_410() {
        let mut k = key(CapabilityPermission::Read, CapabilityScopeType::Workspace, None);
        k.revoked_at = Some(DbTimestamp::from(Timestamp::now()));
        let err = evaluate(Some(&k), "r", CapabilityPermission::Read, None).unwrap_err();
        assert_eq!(err.kind().code(), "KEY_REVOKED");
    }

    #[test]
    fn expired_key_is_not_found_not_revoked() {
        let mut k = key(CapabilityPermission::Read, CapabilityScopeType::Workspace, None);
        k.expires_at = Some(DbTimestamp::from(Timestamp::now() - jiff::Span::new().hours(1)));
        let err = evaluate(Some(&k), "r", CapabilityPermission::Read, None).unwrap_err();
        assert_eq!(err.kind().code(), "NOT_FOUND");
    }

    #[test]
    fn read_key_on_write_tier_is_rejected() {
        let k = key(CapabilityPermission::Read, CapabilityScopeType::Workspace, None);
        let err = evaluate(Some(&k), "w", CapabilityPermission::Write, None).unwrap_err();
        assert_eq!(err.kind().code(), "NOT_FOUND");
    }

    #[test]
    fn write_key_satisfies_read_tier() {
        let k = key(CapabilityPermission::Write, CapabilityScopeType::Workspace, None);
        assert!(evaluate(Some(&k), "r", CapabilityPermission::Read, None).is_ok());
    }

    #[test]
    fn file_scope_requires_exact_path() {
        let k = key(
            CapabilityPermission::Read,
            CapabilityScopeType::File,
            Some("/docs/a.md"),
        );
        assert!(evaluate(Some(&k), "r", CapabilityPermission::Read, Some("/docs/a.md")).is_ok());
        assert!(evaluate(Some(&k), "r", CapabilityPermission::Read, Some("/docs/b.md")).is_err());
    }

    #[test]
    fn folder_scope_matches_prefix() {
        let k = key(
            CapabilityPermission::Read,
            CapabilityScopeType::Folder,
            Some("/docs"),
        );
        assert!(evaluate(Some(&k), "r", CapabilityPermission::Read, Some("/docs/a.md")).is_ok());
        assert!(evaluate(Some(&k), "r", CapabilityPermission::Read, Some("/docsx/a.md")).is_err());
    }
}
