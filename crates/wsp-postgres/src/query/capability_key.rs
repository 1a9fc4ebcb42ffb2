//! Capability-key repository for managing per-scope authorization tokens.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{CapabilityKey, NewCapabilityKey, UpdateCapabilityKey};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for capability-key database operations.
pub trait CapabilityKeyRepository {
    /// Creates a new capability key.
    fn create_capability_key(
        &mut self,
        new_key: NewCapabilityKey,
    ) -> impl Future<Output = PgResult<CapabilityKey>> + Send;

    /// Finds a capability key by ID.
    fn find_capability_key_by_id(
        &mut self,
        key_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<CapabilityKey>>> + Send;

    /// Finds a capability key by the SHA-256 hash of its plaintext.
    ///
    /// This is the lookup used on every admission check, so it is the one hot
    /// path in this repository; the `key_hash` column should be indexed.
    fn find_capability_key_by_hash(
        &mut self,
        hash: &str,
    ) -> impl Future<Output = PgResult<Option<CapabilityKey>>> + Send;

    /// Lists capability keys for a workspace.
    fn list_capability_keys(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<CapabilityKey>>> + Send;

    /// Updates a capability key's mutable fields.
    fn update_capability_key(
        &mut self,
        key_id: Uuid,
        changes: UpdateCapabilityKey,
    ) -> impl Future<Output = PgResult<CapabilityKey>> + Send;

    /// Revokes a capability key immediately.
    fn revoke_capability_key(
        &mut self,
        key_id: Uuid,
    ) -> impl Future<Output = PgResult<CapabilityKey>> + Send;
}

impl CapabilityKeyRepository for PgConnection {
    async fn create_capability_key(
        &mut self,
        new_key: NewCapabilityKey,
    ) -> PgResult<CapabilityKey> {
        use schema::capability_keys;

        diesel::insert_into(capability_keys::table)
            .values(&new_key)
            .returning(CapabilityKey::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_capability_key_by_id(
        &mut self,
        key_id: Uuid,
    ) -> PgResult<Option<CapabilityKey>> {
        use schema::capability_keys::dsl::*;

        capability_keys
            .filter(id.eq(key_id))
            .select(CapabilityKey::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_capability_key_by_hash(
        &mut self,
        hash: &str,
    ) -> PgResult<Option<CapabilityKey>> {
        use schema::capability_keys::dsl::*;

        capability_keys
            .filter(key_hash.eq(hash))
            .select(CapabilityKey::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_capability_keys(
        &mut self,
        ws_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<CapabilityKey>> {
        use schema::capability_keys::dsl::*;

        capability_keys
            .filter(workspace_id.eq(ws_id))
            .select(CapabilityKey::as_select())
            .order(created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_capability_key(
        &mut self,
        key_id: Uuid,
        changes: UpdateCapabilityKey,
    ) -> PgResult<CapabilityKey> {
        use schema::capability_keys::dsl::*;

        diesel::update(capability_keys)
            .filter(id.eq(key_id))
            .set(&changes)
            .returning(CapabilityKey::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn revoke_capability_key(&mut self, key_id: Uuid) -> PgResult<CapabilityKey> {
        use schema::capability_keys::dsl::*;

        diesel::update(capability_keys)
            .filter(id.eq(key_id))
            .set(revoked_at.eq(Some(jiff_diesel::Timestamp::from(Timestamp::now()))))
            .returning(CapabilityKey::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}
