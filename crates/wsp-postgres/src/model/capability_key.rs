//! Capability-key model for PostgreSQL database operations.
//!
//! The plaintext key is never stored. `key_hash` is the SHA-256 digest (see
//! `wsp_core::capability::hash_key`); `prefix` is kept only for identification
//! and logging, never for authorization.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::capability_keys;
use crate::types::{CapabilityPermission, CapabilityScopeType};

/// A capability key record.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = capability_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CapabilityKey {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub prefix: String,
    pub key_hash: String,
    pub permission: CapabilityPermission,
    pub scope_type: CapabilityScopeType,
    pub scope_path: Option<String>,
    pub bound_author: Option<String>,
    pub wip_limit: Option<i32>,
    pub allowed_types: Option<Vec<Option<String>>>,
    pub display_name: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// Data for creating a new capability key.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = capability_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCapabilityKey {
    pub workspace_id: Uuid,
    pub prefix: String,
    pub key_hash: String,
    pub permission: CapabilityPermission,
    pub scope_type: CapabilityScopeType,
    pub scope_path: Option<String>,
    pub bound_author: Option<String>,
    pub wip_limit: Option<i32>,
    pub allowed_types: Option<Vec<Option<String>>>,
    pub display_name: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// Data for updating a capability key. Only revocation and display metadata are
/// mutable; the key material itself is immutable once created.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = capability_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateCapabilityKey {
    pub display_name: Option<Option<String>>,
    pub revoked_at: Option<Option<Timestamp>>,
}

impl CapabilityKey {
    /// Returns whether the key has been explicitly revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns whether the key's `expires_at` has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| jiff::Timestamp::from(exp) <= jiff::Timestamp::now())
    }

    /// Returns whether the key is usable: neither revoked nor expired.
    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }

    /// Returns whether this key's permission tier satisfies the route's
    /// minimum required tier.
    pub fn satisfies(&self, required: CapabilityPermission) -> bool {
        self.permission.satisfies(required)
    }
}
