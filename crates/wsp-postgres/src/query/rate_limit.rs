//! Rate-limit repository implementing the fixed-window admission algorithm.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};

use crate::model::{NewRateLimit, RateLimit};
use crate::{PgConnection, PgError, PgResult, schema};

/// Outcome of a single fixed-window admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request is admitted.
    pub allowed: bool,
    /// Requests remaining in the current window after this one, if admitted.
    pub remaining: i32,
    /// Unix-ms timestamp at which the current window resets.
    pub reset_at_ms: i64,
    /// Seconds the caller should wait before retrying, `0` if admitted.
    pub retry_after_secs: i64,
}

/// Repository for rate-limit counter database operations.
pub trait RateLimitRepository {
    /// Atomically checks and increments the fixed-window counter for `key`.
    ///
    /// `key` is `"<operation>:<identifier>"`. The row is locked for the
    /// duration of the check so concurrent increments serialize per key.
    fn check_rate_limit(
        &mut self,
        key: &str,
        now_ms: i64,
        window_ms: i64,
        limit: i32,
    ) -> impl Future<Output = PgResult<RateLimitDecision>> + Send;

    /// Deletes rate-limit rows whose window has expired by more than
    /// `max_window_ms`, the widest configured window across all operations.
    fn cleanup_expired_rate_limits(
        &mut self,
        now_ms: i64,
        max_window_ms: i64,
    ) -> impl Future<Output = PgResult<u64>> + Send;
}

impl RateLimitRepository for PgConnection {
    async fn check_rate_limit(
        &mut self,
        key: &str,
        now_ms: i64,
        window_ms: i64,
        limit: i32,
    ) -> PgResult<RateLimitDecision> {
        let key = key.to_string();

        self.transaction(|conn| {
            async move {
                use schema::rate_limits::dsl;

                let existing = dsl::rate_limits
                    .filter(dsl::key.eq(&key))
                    .select(RateLimit::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;

                let cutoff = now_ms - window_ms;

                match existing {
                    Some(row) if row.window_start >= cutoff => {
                        if row.count >= limit {
                            let retry_after_ms = row.window_start + window_ms - now_ms;
                            Ok(RateLimitDecision {
                                allowed: false,
                                remaining: 0,
                                reset_at_ms: row.window_start + window_ms,
                                retry_after_secs: (retry_after_ms as f64 / 1000.0)
                                    .ceil()
                                    .max(1.0) as i64,
                            })
                        } else {
                            let new_count = row.count + 1;
                            diesel::update(dsl::rate_limits)
                                .filter(dsl::key.eq(&key))
                                .set(dsl::count.eq(new_count))
                                .execute(conn)
                                .await?;

                            Ok(RateLimitDecision {
                                allowed: true,
                                remaining: (limit - new_count).max(0),
                                reset_at_ms: row.window_start + window_ms,
                                retry_after_secs: 0,
                            })
                        }
                    }
                    _ => {
                        diesel::insert_into(dsl::rate_limits)
                            .values(&NewRateLimit {
                                key: key.clone(),
                                count: 1,
                                window_start: now_ms,
                            })
                            .on_conflict(dsl::key)
                            .do_update()
                            .set((dsl::count.eq(1), dsl::window_start.eq(now_ms)))
                            .execute(conn)
                            .await?;

                        Ok(RateLimitDecision {
                            allowed: true,
                            remaining: (limit - 1).max(0),
                            reset_at_ms: now_ms + window_ms,
                            retry_after_secs: 0,
                        })
                    }
                }
            }
            .scope_boxed()
        })
        .await
        .map_err(PgError::from)
    }

    async fn cleanup_expired_rate_limits(
        &mut self,
        now_ms: i64,
        max_window_ms: i64,
    ) -> PgResult<u64> {
        use schema::rate_limits::dsl::*;

        let cutoff = now_ms - max_window_ms;
        let deleted = diesel::delete(rate_limits)
            .filter(window_start.lt(cutoff))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted as u64)
    }
}
