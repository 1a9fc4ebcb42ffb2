//! Append-log repository: the permanent, append-only task/claim/comment history.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{Append, NewAppend, UpdateAppend};
use crate::types::{AppendStatus, AppendType, Pagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for append-log database operations.
pub trait AppendRepository {
    /// Appends a new entry to the log. Entries are never updated in place
    /// except for their state-machine fields (see [`update_append_status`]).
    ///
    /// [`update_append_status`]: AppendRepository::update_append_status
    fn create_append(&mut self, new_append: NewAppend) -> impl Future<Output = PgResult<Append>> + Send;

    /// Finds an append entry by its internal ID.
    fn find_append_by_id(
        &mut self,
        append_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Append>>> + Send;

    /// Finds an append entry by its caller-facing `append_id` string within a file.
    fn find_append_by_append_id(
        &mut self,
        file_id: Uuid,
        append_id_str: &str,
    ) -> impl Future<Output = PgResult<Option<Append>>> + Send;

    /// Lists append entries for a file, oldest first (log order).
    fn list_appends(
        &mut self,
        file_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Append>>> + Send;

    /// Lists unexpired claimed/active task appends for a file, used to enforce
    /// the per-author work-in-progress limit.
    fn list_open_claims(
        &mut self,
        file_id: Uuid,
        author: &str,
    ) -> impl Future<Output = PgResult<Vec<Append>>> + Send;

    /// Updates an append's status or claim expiry.
    fn update_append_status(
        &mut self,
        append_id: Uuid,
        changes: UpdateAppend,
    ) -> impl Future<Output = PgResult<Append>> + Send;

    /// Marks expired claims found in `workspace_id` as [`AppendStatus::Expired`],
    /// returning how many rows changed.
    fn expire_stale_claims(&mut self, workspace_id: Uuid) -> impl Future<Output = PgResult<u64>> + Send;

    /// Finds claimed appends in `workspace_id` whose `expires_at` has passed,
    /// without mutating them. Used by the scheduler's claim-expiry job to
    /// know which claims to individually transition and publish events for.
    fn list_stale_claims(&mut self, workspace_id: Uuid) -> impl Future<Output = PgResult<Vec<Append>>> + Send;
}

impl AppendRepository for PgConnection {
    async fn create_append(&mut self, new_append: NewAppend) -> PgResult<Append> {
        use schema::appends;

        diesel::insert_into(appends::table)
            .values(&new_append)
            .returning(Append::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_append_by_id(&mut self, aid: Uuid) -> PgResult<Option<Append>> {
        use schema::appends::dsl::*;

        appends
            .filter(id.eq(aid))
            .select(Append::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_append_by_append_id(
        &mut self,
        fid: Uuid,
        append_id_str: &str,
    ) -> PgResult<Option<Append>> {
        use schema::appends::dsl::*;

        appends
            .filter(file_id.eq(fid))
            .filter(append_id.eq(append_id_str))
            .select(Append::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_appends(&mut self, fid: Uuid, pagination: Pagination) -> PgResult<Vec<Append>> {
        use schema::appends::dsl::*;

        appends
            .filter(file_id.eq(fid))
            .select(Append::as_select())
            .order(created_at.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_open_claims(&mut self, fid: Uuid, who: &str) -> PgResult<Vec<Append>> {
        use schema::appends::dsl::*;

        appends
            .filter(file_id.eq(fid))
            .filter(author.eq(who))
            .filter(type_.eq(AppendType::Claim))
            .filter(status.eq(Some(AppendStatus::Active)))
            .select(Append::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_append_status(
        &mut self,
        aid: Uuid,
        changes: UpdateAppend,
    ) -> PgResult<Append> {
        use schema::appends::dsl::*;

        diesel::update(appends)
            .filter(id.eq(aid))
            .set(&changes)
            .returning(Append::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn expire_stale_claims(&mut self, ws_id: Uuid) -> PgResult<u64> {
        use schema::appends::dsl::*;

        let now = jiff_diesel::Timestamp::from(Timestamp::now());
        let updated = diesel::update(appends)
            .filter(workspace_id.eq(ws_id))
            .filter(type_.eq(AppendType::Claim))
            .filter(status.eq(Some(AppendStatus::Active)))
            .filter(expires_at.lt(Some(now)))
            .set(status.eq(Some(AppendStatus::Expired)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(updated as u64)
    }

    async fn list_stale_claims(&mut self, ws_id: Uuid) -> PgResult<Vec<Append>> {
        use schema::appends::dsl::*;

        let now = jiff_diesel::Timestamp::from(Timestamp::now());
        appends
            .filter(workspace_id.eq(ws_id))
            .filter(type_.eq(AppendType::Claim))
            .filter(status.eq(Some(AppendStatus::Active)))
            .filter(expires_at.lt(Some(now)))
            .select(Append::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
