//! Webhook delivery model for PostgreSQL database operations.
//!
//! Delivery records are an immutable audit log: there is no `AsChangeset`,
//! only insertion. Retention is 7 days, enforced by the reaper job.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::webhook_deliveries;
use crate::types::DeliveryStatus;

/// Retention window for delivery records, in days.
pub const RETENTION_DAYS: i64 = 7;

/// An immutable record of one outbound webhook delivery attempt.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = webhook_deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WebhookDelivery {
    pub id: Uuid,
    pub webhook_id: Uuid,
    pub event: String,
    pub status: DeliveryStatus,
    pub response_code: Option<i32>,
    pub duration_ms: Option<i32>,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

/// Data for recording a new delivery attempt.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWebhookDelivery {
    pub webhook_id: Uuid,
    pub event: String,
    pub status: DeliveryStatus,
    pub response_code: Option<i32>,
    pub duration_ms: Option<i32>,
    pub error: Option<String>,
}
