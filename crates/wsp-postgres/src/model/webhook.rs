//! Webhook model for PostgreSQL database operations.
//!
//! `secret_hash` is historically named but stores the signing secret itself —
//! the same value used as the HMAC key for outbound signing, not a one-way
//! digest of it. Kept as-is rather than introducing a migration.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::webhooks;
use crate::types::CapabilityScopeType;

/// A webhook subscription row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Webhook {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub scope_type: CapabilityScopeType,
    pub scope_path: Option<String>,
    pub url: String,
    pub events: Vec<Option<String>>,
    pub secret_hash: Option<String>,
    pub recursive: bool,
    pub failure_count: i32,
    pub disabled_at: Option<Timestamp>,
    pub last_triggered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Number of consecutive non-2xx deliveries after which a webhook is disabled.
pub const MAX_CONSECUTIVE_FAILURES: i32 = 5;

/// Data for creating a new webhook.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWebhook {
    pub workspace_id: Uuid,
    pub scope_type: CapabilityScopeType,
    pub scope_path: Option<String>,
    pub url: String,
    pub events: Vec<Option<String>>,
    pub secret_hash: Option<String>,
    pub recursive: bool,
}

/// Data for updating a webhook.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = webhooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWebhook {
    pub url: Option<String>,
    pub events: Option<Vec<Option<String>>>,
    pub secret_hash: Option<Option<String>>,
    pub recursive: Option<bool>,
    pub failure_count: Option<i32>,
    pub disabled_at: Option<Option<Timestamp>>,
    pub last_triggered_at: Option<Option<Timestamp>>,
    pub deleted_at: Option<Option<Timestamp>>,
}

impl Webhook {
    /// Returns whether the webhook is active (neither disabled nor soft-deleted).
    pub fn is_active(&self) -> bool {
        self.disabled_at.is_none() && self.deleted_at.is_none()
    }

    /// Returns whether the webhook has tripped the consecutive-failure breaker.
    pub fn has_exceeded_failures(&self) -> bool {
        self.failure_count >= MAX_CONSECUTIVE_FAILURES
    }

    /// Returns whether `event` matches this webhook's subscriptions, honoring
    /// the `*` wildcard and top-level category matching (`"file"` matches
    /// `"file.created"`).
    pub fn subscribes_to(&self, event: &str) -> bool {
        self.events.iter().flatten().any(|subscribed| {
            subscribed == "*"
                || subscribed == event
                || event
                    .strip_prefix(subscribed.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Returns whether `path` falls within this webhook's scope.
    pub fn matches_scope(&self, path: &str) -> bool {
        match self.scope_type {
            CapabilityScopeType::Workspace => true,
            CapabilityScopeType::File => self.scope_path.as_deref() == Some(path),
            CapabilityScopeType::Folder => {
                // None, "", and "/" are all the workspace root; strip any
                // trailing slash so a normalized non-root scope never
                // double-counts it when building the `scope + "/"` prefix.
                let scope = self.scope_path.as_deref().unwrap_or("");
                let scope = scope.strip_suffix('/').unwrap_or(scope);

                let Some(tail) = (if scope.is_empty() {
                    path.strip_prefix('/')
                } else {
                    path.strip_prefix(scope).and_then(|rest| rest.strip_prefix('/'))
                }) else {
                    return false;
                };

                self.recursive || !tail.contains('/')
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webhook(scope_type: CapabilityScopeType, scope_path: Option<&str>, recursive: bool) -> Webhook {
        Webhook {
            id: Uuid::nil(),
            workspace_id: Uuid::nil(),
            scope_type,
            scope_path: scope_path.map(str::to_owned),
            url: "https://example.com/hook".into(),
            events: vec![Some("file.created".into())],
            secret_hash: None,
            recursive,
            failure_count: 0,
            disabled_at: None,
            last_triggered_at: None,
            created_at: jiff::Timestamp::now().into(),
            deleted_at: None,
        }
    }

    #[test]
    fn wildcard_event_matches_anything() {
        let mut w = webhook(CapabilityScopeType::Workspace, None, false);
        w.events = vec![Some("*".into())];
        assert!(w.subscribes_to("claim.expired"));
    }

    #[test]
    fn category_event_matches_subevents_only() {
        let mut w = webhook(CapabilityScopeType::Workspace, None, false);
        w.events = vec![Some("file".into())];
        assert!(w.subscribes_to("file.created"));
        assert!(!w.subscribes_to("filesystem.created"));
        assert!(!w.subscribes_to("file"));
    }

    #[test]
    fn non_recursive_folder_scope_matches_direct_children_only() {
        let w = webhook(CapabilityScopeType::Folder, Some("/a"), false);
        assert!(w.matches_scope("/a/b"));
        assert!(!w.matches_scope("/a/b/c"));
    }

    #[test]
    fn recursive_folder_scope_matches_nested_children() {
        let w = webhook(CapabilityScopeType::Folder, Some("/a"), true);
        assert!(w.matches_scope("/a/b"));
        assert!(w.matches_scope("/a/b/c"));
    }

    #[test]
    fn root_folder_scope_non_recursive_matches_direct_children_only() {
        for scope_path in [None, Some(""), Some("/")] {
            let w = webhook(CapabilityScopeType::Folder, scope_path, false);
            assert!(w.matches_scope("/a"), "scope_path={scope_path:?}");
            assert!(!w.matches_scope("/a/b"), "scope_path={scope_path:?}");
        }
    }

    #[test]
    fn root_folder_scope_recursive_matches_every_depth() {
        for scope_path in [None, Some(""), Some("/")] {
            let w = webhook(CapabilityScopeType::Folder, scope_path, true);
            assert!(w.matches_scope("/a"), "scope_path={scope_path:?}");
            assert!(w.matches_scope("/a/b/c"), "scope_path={scope_path:?}");
        }
    }

    #[test]
    fn exceeded_failures_threshold() {
        let mut w = webhook(CapabilityScopeType::Workspace, None, false);
        w.failure_count = MAX_CONSECUTIVE_FAILURES;
        assert!(w.has_exceeded_failures());
        w.failure_count -= 1;
        assert!(!w.has_exceeded_failures());
    }
}
