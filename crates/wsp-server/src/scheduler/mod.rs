//! Background scheduler (component K): periodic maintenance jobs running
//! independently of request traffic.
//!
//! Every job re-derives `now` at the start of its own tick rather than
//! sharing a timestamp across jobs, so a job is safe to run concurrently
//! with, or re-entrantly after, any other. A failing tick is logged and
//! retried on the next interval; it never aborts the scheduler.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wsp_postgres::model::UpdateAppend;
use wsp_postgres::query::{
    AppendRepository, FileRepository, RateLimitRepository, WebhookDeliveryRepository, WorkspaceRepository,
};
use wsp_postgres::types::{AppendStatus, Pagination};
use wsp_postgres::PgClient;

use crate::admission::rate_limit::{self, RateLimitConfig};
use crate::events::{Event, EventBus};

/// Tracing target for scheduler jobs.
pub const TRACING_TARGET: &str = "wsp_server::scheduler";

const EXPIRE_CLAIMS_INTERVAL: Duration = Duration::from_secs(30);
const CLEANUP_RATE_LIMITS_INTERVAL: Duration = Duration::from_secs(5 * 60);
const CLEANUP_WEBHOOK_DELIVERIES_INTERVAL: Duration = Duration::from_secs(60 * 60);
const CLEANUP_DELETED_FILES_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// The set of workspaces scanned per claim-expiry tick. The claim-expiry job
/// is the only one that must enumerate tenants individually (the others
/// operate on a single global table), so this bound, not workspace count,
/// sets the job's real cost; a workspace count beyond this is a scale this
/// service does not yet target.
const MAX_WORKSPACES_PER_TICK: i64 = 1000;

/// Handle to the running scheduler. Dropping it does not stop the jobs —
/// call [`Scheduler::shutdown`] to stop them and await their current tick.
pub struct Scheduler {
    cancel_token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawns all background jobs. `rate_limit_config` is needed only to
    /// compute the widest configured window for the rate-limit reaper.
    pub fn spawn(db: PgClient, bus: EventBus, rate_limit_config: RateLimitConfig) -> Self {
        let cancel_token = CancellationToken::new();

        let tasks = vec![
            tokio::spawn(run_job(
                cancel_token.clone(),
                EXPIRE_CLAIMS_INTERVAL,
                "expire_claims",
                {
                    let db = db.clone();
                    let bus = bus.clone();
                    move || expire_claims(db.clone(), bus.clone())
                },
            )),
            tokio::spawn(run_job(
                cancel_token.clone(),
                CLEANUP_RATE_LIMITS_INTERVAL,
                "cleanup_expired_rate_limits",
                {
                    let db = db.clone();
                    let config = rate_limit_config.clone();
                    move || cleanup_expired_rate_limits(db.clone(), config.clone())
                },
            )),
            tokio::spawn(run_job(
                cancel_token.clone(),
                CLEANUP_WEBHOOK_DELIVERIES_INTERVAL,
                "cleanup_webhook_deliveries",
                {
                    let db = db.clone();
                    move || cleanup_webhook_deliveries(db.clone())
                },
            )),
            tokio::spawn(run_job(
                cancel_token.clone(),
                CLEANUP_DELETED_FILES_INTERVAL,
                "cleanup_deleted_files",
                {
                    let db = db.clone();
                    move || cleanup_deleted_files(db.clone())
                },
            )),
        ];

        Self { cancel_token, tasks }
    }

    /// Signals every job to stop and waits for their current tick to finish.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        for task in self.tasks {
            if let Err(err) = task.await {
                tracing::warn!(target: TRACING_TARGET, error = %err, "scheduler task panicked during shutdown");
            }
        }
    }
}

/// Runs `job` on a fixed interval until cancelled, logging (not propagating)
/// any error a tick returns.
async fn run_job<F, Fut>(cancel_token: CancellationToken, interval: Duration, name: &'static str, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = wsp_postgres::PgResult<()>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                tracing::info!(target: TRACING_TARGET, job = name, "scheduler job stopping");
                break;
            }

            _ = ticker.tick() => {
                if let Err(err) = job().await {
                    tracing::warn!(target: TRACING_TARGET, job = name, error = %err, "scheduler job tick failed");
                }
            }
        }
    }
}

/// `expireClaims`: finds claimed appends past their `expires_at`, marks each
/// expired, flips the task append they reference back to `pending`, and
/// publishes a `claim.expired` event for each.
async fn expire_claims(db: PgClient, bus: EventBus) -> wsp_postgres::PgResult<()> {
    let mut conn = db.get_connection().await?;
    let workspaces = conn.list_workspaces(Pagination::new(MAX_WORKSPACES_PER_TICK, 0)).await?;

    for workspace in workspaces {
        let stale = conn.list_stale_claims(workspace.id).await?;
        for claim in stale {
            conn.update_append_status(
                claim.id,
                UpdateAppend {
                    status: Some(Some(AppendStatus::Expired)),
                    expires_at: None,
                },
            )
            .await?;

            if let Some(task_append_id) = &claim.reference {
                if let Some(task) = conn.find_append_by_append_id(claim.file_id, task_append_id).await? {
                    conn.update_append_status(
                        task.id,
                        UpdateAppend {
                            status: Some(Some(AppendStatus::Pending)),
                            expires_at: None,
                        },
                    )
                    .await?;
                }
            }

            bus.publish(Event::new(
                workspace.id,
                "claim.expired",
                None,
                serde_json::json!({
                    "claimId": claim.append_id,
                    "taskId": claim.reference,
                    "author": claim.author,
                    "expiredAt": jiff::Timestamp::now().to_string(),
                }),
            ));
        }
    }

    Ok(())
}

/// `cleanupExpiredRateLimits`: removes rate-limit counter rows whose window
/// has closed even under the widest configured window, across every operation.
async fn cleanup_expired_rate_limits(db: PgClient, config: RateLimitConfig) -> wsp_postgres::PgResult<()> {
    let mut conn = db.get_connection().await?;
    let now_ms = jiff::Timestamp::now().as_millisecond();
    let max_window_ms = rate_limit::max_window_ms(&config);

    let deleted = conn.cleanup_expired_rate_limits(now_ms, max_window_ms).await?;
    if deleted > 0 {
        tracing::debug!(target: TRACING_TARGET, deleted, "cleaned up expired rate-limit counters");
    }
    Ok(())
}

/// `cleanupWebhookDeliveries`: enforces the 7-day delivery-record retention
/// window.
async fn cleanup_webhook_deliveries(db: PgClient) -> wsp_postgres::PgResult<()> {
    let mut conn = db.get_connection().await?;
    let deleted = conn.cleanup_expired_deliveries().await?;
    if deleted > 0 {
        tracing::debug!(target: TRACING_TARGET, deleted, "cleaned up expired webhook delivery records");
    }
    Ok(())
}

/// `cleanupDeletedFiles`: hard-deletes soft-deleted file rows past the 7-day
/// retention window.
async fn cleanup_deleted_files(db: PgClient) -> wsp_postgres::PgResult<()> {
    let mut conn = db.get_connection().await?;
    let deleted = conn.cleanup_deleted_files().await?;
    if deleted > 0 {
        tracing::debug!(target: TRACING_TARGET, deleted, "hard-deleted soft-deleted file rows past retention");
    }
    Ok(())
}
