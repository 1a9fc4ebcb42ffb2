//! Append-log entry model for PostgreSQL database operations.
//!
//! Appends are never deleted or hard-mutated beyond the state-transition
//! columns (`status`); the log itself is permanent audit history.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::appends;
use crate::types::{AppendStatus, AppendType};

/// An append-log entry: a task, claim, response, comment, or related event.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = appends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Append {
    pub id: Uuid,
    pub file_id: Uuid,
    pub workspace_id: Uuid,
    pub append_id: String,
    pub author: String,
    #[diesel(column_name = type_)]
    pub append_type: AppendType,
    pub status: Option<AppendStatus>,
    pub priority: Option<String>,
    pub labels: Option<serde_json::Value>,
    #[diesel(column_name = ref_)]
    pub reference: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub content_preview: Option<String>,
    pub created_at: Timestamp,
}

/// Data for creating a new append-log entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAppend {
    pub file_id: Uuid,
    pub workspace_id: Uuid,
    pub append_id: String,
    pub author: String,
    #[diesel(column_name = type_)]
    pub append_type: AppendType,
    pub status: Option<AppendStatus>,
    pub priority: Option<String>,
    pub labels: Option<serde_json::Value>,
    #[diesel(column_name = ref_)]
    pub reference: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub content_preview: Option<String>,
}

/// Data for updating an append's state-machine fields. Only `status` and the
/// claim-expiry `expires_at` are ever mutated after creation.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = appends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAppend {
    pub status: Option<Option<AppendStatus>>,
    pub expires_at: Option<Option<Timestamp>>,
}

impl Append {
    /// Returns whether a task-type claim on this append has expired by `now`.
    pub fn is_expired(&self, now: jiff::Timestamp) -> bool {
        self.expires_at
            .is_some_and(|exp| jiff::Timestamp::from(exp) <= now)
    }
}
