//! Server-to-server API key repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{ApiKey, NewApiKey, UpdateApiKey};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for API key database operations.
pub trait ApiKeyRepository {
    /// Creates a new API key.
    fn create_api_key(&mut self, new_key: NewApiKey) -> impl Future<Output = PgResult<ApiKey>> + Send;

    /// Finds an API key by ID.
    fn find_api_key_by_id(
        &mut self,
        key_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<ApiKey>>> + Send;

    /// Finds an API key by the SHA-256 hash of its plaintext.
    fn find_api_key_by_hash(
        &mut self,
        hash: &str,
    ) -> impl Future<Output = PgResult<Option<ApiKey>>> + Send;

    /// Lists API keys, optionally scoped to one workspace.
    fn list_api_keys(
        &mut self,
        workspace_id: Option<Uuid>,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<ApiKey>>> + Send;

    /// Updates an API key's mutable fields.
    fn update_api_key(
        &mut self,
        key_id: Uuid,
        changes: UpdateApiKey,
    ) -> impl Future<Output = PgResult<ApiKey>> + Send;

    /// Records that a key was just used, for audit purposes.
    fn touch_api_key_last_used(&mut self, key_id: Uuid) -> impl Future<Output = PgResult<()>> + Send;

    /// Revokes an API key immediately.
    fn revoke_api_key(&mut self, key_id: Uuid) -> impl Future<Output = PgResult<ApiKey>> + Send;
}

impl ApiKeyRepository for PgConnection {
    async fn create_api_key(&mut self, new_key: NewApiKey) -> PgResult<ApiKey> {
        use schema::api_keys;

        diesel::insert_into(api_keys::table)
            .values(&new_key)
            .returning(ApiKey::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_api_key_by_id(&mut self, key_id: Uuid) -> PgResult<Option<ApiKey>> {
        use schema::api_keys::dsl::*;

        api_keys
            .filter(id.eq(key_id))
            .select(ApiKey::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_api_key_by_hash(&mut self, hash: &str) -> PgResult<Option<ApiKey>> {
        use schema::api_keys::dsl::*;

        api_keys
            .filter(key_hash.eq(hash))
            .select(ApiKey::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_api_keys(
        &mut self,
        ws_id: Option<Uuid>,
        pagination: Pagination,
    ) -> PgResult<Vec<ApiKey>> {
        use schema::api_keys::dsl::*;

        let mut query = api_keys.select(ApiKey::as_select()).into_boxed();
        if let Some(ws_id) = ws_id {
            query = query.filter(workspace_id.eq(ws_id));
        }

        query
            .order(created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_api_key(&mut self, key_id: Uuid, changes: UpdateApiKey) -> PgResult<ApiKey> {
        use schema::api_keys::dsl::*;

        diesel::update(api_keys)
            .filter(id.eq(key_id))
            .set(&changes)
            .returning(ApiKey::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn touch_api_key_last_used(&mut self, key_id: Uuid) -> PgResult<()> {
        use schema::api_keys::dsl::*;

        diesel::update(api_keys)
            .filter(id.eq(key_id))
            .set(last_used_at.eq(Some(jiff_diesel::Timestamp::from(Timestamp::now()))))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn revoke_api_key(&mut self, key_id: Uuid) -> PgResult<ApiKey> {
        use schema::api_keys::dsl::*;

        diesel::update(api_keys)
            .filter(id.eq(key_id))
            .set(revoked_at.eq(Some(jiff_diesel::Timestamp::from(Timestamp::now()))))
            .returning(ApiKey::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}
