//! Webhook repository for managing webhook subscriptions and delivery state.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{NewWebhook, UpdateWebhook, Webhook};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for webhook database operations.
pub trait WebhookRepository {
    /// Creates a new webhook.
    fn create_webhook(
        &mut self,
        new_webhook: NewWebhook,
    ) -> impl Future<Output = PgResult<Webhook>> + Send;

    /// Finds a webhook by ID.
    fn find_webhook_by_id(
        &mut self,
        webhook_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Webhook>>> + Send;

    /// Lists webhooks for a workspace.
    fn list_webhooks(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Webhook>>> + Send;

    /// Lists active (not disabled, not deleted) webhooks for a workspace.
    ///
    /// The caller is responsible for filtering by scope and event with
    /// [`Webhook::matches_scope`] and [`Webhook::subscribes_to`] — both depend
    /// on the triggering event's path, which this query has no visibility into.
    fn list_active_webhooks(
        &mut self,
        workspace_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Webhook>>> + Send;

    /// Updates a webhook.
    fn update_webhook(
        &mut self,
        webhook_id: Uuid,
        changes: UpdateWebhook,
    ) -> impl Future<Output = PgResult<Webhook>> + Send;

    /// Soft deletes a webhook.
    fn delete_webhook(&mut self, webhook_id: Uuid) -> impl Future<Output = PgResult<()>> + Send;

    /// Records a successful delivery: resets the failure count and timestamps.
    fn record_webhook_success(
        &mut self,
        webhook_id: Uuid,
    ) -> impl Future<Output = PgResult<Webhook>> + Send;

    /// Records a failed delivery, disabling the webhook if the consecutive
    /// failure count reaches [`crate::model::MAX_CONSECUTIVE_FAILURES`].
    fn record_webhook_failure(
        &mut self,
        webhook_id: Uuid,
    ) -> impl Future<Output = PgResult<Webhook>> + Send;

    /// Re-enables a disabled webhook and resets its failure count.
    fn reenable_webhook(
        &mut self,
        webhook_id: Uuid,
    ) -> impl Future<Output = PgResult<Webhook>> + Send;
}

impl WebhookRepository for PgConnection {
    async fn create_webhook(&mut self, new_webhook: NewWebhook) -> PgResult<Webhook> {
        use schema::webhooks;

        diesel::insert_into(webhooks::table)
            .values(&new_webhook)
            .returning(Webhook::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_webhook_by_id(&mut self, webhook_id: Uuid) -> PgResult<Option<Webhook>> {
        use schema::webhooks::dsl::*;

        webhooks
            .filter(id.eq(webhook_id))
            .filter(deleted_at.is_null())
            .select(Webhook::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_webhooks(
        &mut self,
        ws_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Webhook>> {
        use schema::webhooks::dsl::*;

        webhooks
            .filter(workspace_id.eq(ws_id))
            .filter(deleted_at.is_null())
            .select(Webhook::as_select())
            .order(created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_active_webhooks(&mut self, ws_id: Uuid) -> PgResult<Vec<Webhook>> {
        use schema::webhooks::dsl::*;

        webhooks
            .filter(workspace_id.eq(ws_id))
            .filter(disabled_at.is_null())
            .filter(deleted_at.is_null())
            .select(Webhook::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_webhook(
        &mut self,
        webhook_id: Uuid,
        changes: UpdateWebhook,
    ) -> PgResult<Webhook> {
        use schema::webhooks::dsl::*;

        diesel::update(webhooks)
            .filter(id.eq(webhook_id))
            .set(&changes)
            .returning(Webhook::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_webhook(&mut self, webhook_id: Uuid) -> PgResult<()> {
        use schema::webhooks::dsl::*;

        diesel::update(webhooks)
            .filter(id.eq(webhook_id))
            .set(deleted_at.eq(Some(jiff_diesel::Timestamp::from(Timestamp::now()))))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn record_webhook_success(&mut self, webhook_id: Uuid) -> PgResult<Webhook> {
        use schema::webhooks::dsl::*;

        let now = jiff_diesel::Timestamp::from(Timestamp::now());
        diesel::update(webhooks)
            .filter(id.eq(webhook_id))
            .set((failure_count.eq(0), last_triggered_at.eq(Some(now))))
            .returning(Webhook::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn record_webhook_failure(&mut self, webhook_id: Uuid) -> PgResult<Webhook> {
        use schema::webhooks::dsl::*;

        let now = jiff_diesel::Timestamp::from(Timestamp::now());

        let current = webhooks
            .filter(id.eq(webhook_id))
            .select(Webhook::as_select())
            .first(self)
            .await
            .map_err(PgError::from)?;

        let new_count = current.failure_count + 1;
        let disabled = if new_count >= crate::model::MAX_CONSECUTIVE_FAILURES {
            Some(now)
        } else {
            current.disabled_at
        };

        diesel::update(webhooks)
            .filter(id.eq(webhook_id))
            .set((
                failure_count.eq(new_count),
                last_triggered_at.eq(Some(now)),
                disabled_at.eq(disabled),
            ))
            .returning(Webhook::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn reenable_webhook(&mut self, webhook_id: Uuid) -> PgResult<Webhook> {
        use schema::webhooks::dsl::*;

        diesel::update(webhooks)
            .filter(id.eq(webhook_id))
            .set((failure_count.eq(0), disabled_at.eq(None::<jiff_diesel::Timestamp>)))
            .returning(Webhook::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}
