//! Rate-limit counter model for PostgreSQL database operations.
//!
//! The table has no surrogate id: `key` (`"<operation>:<identifier>"`) is the
//! primary key, so concurrent increments can be expressed as a single prepared
//! UPSERT keyed by that column.

use diesel::prelude::*;

use crate::schema::rate_limits;

/// A fixed-window rate-limit counter row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = rate_limits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RateLimit {
    pub key: String,
    pub count: i32,
    pub window_start: i64,
}

/// Data for creating a new rate-limit counter row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rate_limits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRateLimit {
    pub key: String,
    pub count: i32,
    pub window_start: i64,
}

/// Data for updating a rate-limit counter row.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = rate_limits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateRateLimit {
    pub count: Option<i32>,
    pub window_start: Option<i64>,
}

impl RateLimit {
    /// Returns whether the counter's window is still current at `now_secs`.
    pub fn is_fresh(&self, now_ms: i64, window_ms: i64) -> bool {
        now_ms - self.window_start < window_ms
    }
}
