//! Server-to-server API key model for PostgreSQL database operations.
//!
//! Distinct from capability keys: an API key is presented via
//! `Authorization: Bearer sk_(live|test)_...` and carries named scopes rather
//! than a single tiered permission.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::api_keys;
use crate::types::ApiKeyScope;

/// An API key record. `workspace_id` is `None` for keys scoped to the whole
/// deployment rather than a single workspace.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = api_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApiKey {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub prefix: String,
    pub key_hash: String,
    pub scopes: Vec<Option<ApiKeyScope>>,
    pub display_name: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub last_used_at: Option<Timestamp>,
}

/// Data for creating a new API key.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = api_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewApiKey {
    pub workspace_id: Option<Uuid>,
    pub prefix: String,
    pub key_hash: String,
    pub scopes: Vec<Option<ApiKeyScope>>,
    pub display_name: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// Data for updating an API key.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = api_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateApiKey {
    pub display_name: Option<Option<String>>,
    pub revoked_at: Option<Option<Timestamp>>,
    pub last_used_at: Option<Option<Timestamp>>,
}

impl ApiKey {
    /// Returns whether the key is usable: neither revoked nor expired.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
            && !self
                .expires_at
                .is_some_and(|exp| jiff::Timestamp::from(exp) <= jiff::Timestamp::now())
    }

    /// Returns whether the key carries the given scope.
    pub fn has_scope(&self, scope: ApiKeyScope) -> bool {
        self.scopes.iter().flatten().any(|s| *s == scope)
    }
}
