//! File model for PostgreSQL database operations.
//!
//! Only the columns the soft-delete reaper (component K) needs are modeled
//! here. File content, folders, and the rest of the file-CRUD schema belong
//! to an external component this crate does not own (spec.md §1).

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::files;

/// Retention window after soft-delete before a file row is hard-deleted, in days.
pub const RETENTION_DAYS: i64 = 7;

/// A workspace-owned file, as far as this crate's reaper needs to know.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct File {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
