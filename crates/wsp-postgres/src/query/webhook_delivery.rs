//! Webhook delivery repository: an append-only audit log with retention.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::{Span, Timestamp};
use uuid::Uuid;

use crate::model::{NewWebhookDelivery, WebhookDelivery, RETENTION_DAYS};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for webhook delivery database operations.
pub trait WebhookDeliveryRepository {
    /// Records a new delivery attempt.
    fn record_delivery(
        &mut self,
        new_delivery: NewWebhookDelivery,
    ) -> impl Future<Output = PgResult<WebhookDelivery>> + Send;

    /// Lists delivery attempts for a webhook, most recent first.
    fn list_deliveries(
        &mut self,
        webhook_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<WebhookDelivery>>> + Send;

    /// Deletes delivery records older than the retention window.
    fn cleanup_expired_deliveries(&mut self) -> impl Future<Output = PgResult<u64>> + Send;
}

impl WebhookDeliveryRepository for PgConnection {
    async fn record_delivery(
        &mut self,
        new_delivery: NewWebhookDelivery,
    ) -> PgResult<WebhookDelivery> {
        use schema::webhook_deliveries;

        diesel::insert_into(webhook_deliveries::table)
            .values(&new_delivery)
            .returning(WebhookDelivery::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_deliveries(
        &mut self,
        wh_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<WebhookDelivery>> {
        use schema::webhook_deliveries::dsl::*;

        webhook_deliveries
            .filter(webhook_id.eq(wh_id))
            .select(WebhookDelivery::as_select())
            .order(created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn cleanup_expired_deliveries(&mut self) -> PgResult<u64> {
        use schema::webhook_deliveries::dsl::*;

        let cutoff = Timestamp::now() - Span::new().days(RETENTION_DAYS);
        let deleted = diesel::delete(webhook_deliveries)
            .filter(created_at.lt(jiff_diesel::Timestamp::from(cutoff)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted as u64)
    }
}
