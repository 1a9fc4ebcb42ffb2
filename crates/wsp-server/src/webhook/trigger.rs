//! Webhook trigger (component I): a bus subscriber that fans domain events
//! out to matching webhook subscriptions as signed outbound HTTP deliveries.
//!
//! Each event's work-unit here is to enqueue the delivery, not await it to
//! completion before moving to the next event — the task loops over
//! `deliver_one` sequentially per event today, which is sufficient at the
//! scale this service targets; a slow endpoint only delays its own
//! workspace's further deliveries, not the bus itself (publishers never block
//! on this subscriber).

use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use url::Url;
use wsp_postgres::model::{NewWebhookDelivery, Webhook};
use wsp_postgres::query::{WebhookDeliveryRepository, WebhookRepository};
use wsp_postgres::types::DeliveryStatus;
use wsp_postgres::{PgClient, PgConnection};
use wsp_webhook::ssrf::validate_webhook_url;
use wsp_webhook::{SsrfVerdict, WebhookContext, WebhookRequest, WebhookService};

use crate::events::{Event, EventBus};

/// Tracing target for webhook trigger operations.
pub const TRACING_TARGET: &str = "wsp_server::webhook";

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Subscribes to `bus` and delivers matching webhooks until the bus closes.
/// Returns the task's join handle so callers can await it during shutdown.
pub fn spawn(
    db: PgClient,
    webhooks: WebhookService,
    bus: &EventBus,
    allow_http: bool,
) -> tokio::task::JoinHandle<()> {
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(err) = handle_event(&db, &webhooks, &event, allow_http).await {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            error = %err,
                            event = %event.event,
                            "webhook trigger failed to process event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        skipped,
                        "webhook trigger lagged, dropping events"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_event(
    db: &PgClient,
    webhooks: &WebhookService,
    event: &Event,
    allow_http: bool,
) -> wsp_postgres::PgResult<()> {
    let mut conn = db.get_connection().await?;
    let candidates = conn.list_active_webhooks(event.workspace_id).await?;

    let path = event.path.as_deref().unwrap_or("/");
    for webhook in candidates {
        if !webhook.subscribes_to(&event.event) || !webhook.matches_scope(path) {
            continue;
        }
        deliver_one(&mut conn, webhooks, &webhook, event, allow_http).await;
    }

    Ok(())
}

async fn deliver_one(
    conn: &mut PgConnection,
    webhooks: &WebhookService,
    webhook: &Webhook,
    event: &Event,
    allow_http: bool,
) {
    // Re-validated on every delivery, not just at webhook create/update time,
    // so a target rebound to a private address after registration (DNS
    // rebinding) is still caught.
    if let SsrfVerdict::Blocked(reason) = validate_webhook_url(&webhook.url, allow_http).await {
        record(conn, webhook.id, &event.event, DeliveryStatus::Error, None, None, Some(format!("SSRF protection: {reason}"))).await;
        return;
    }

    let url = match Url::parse(&webhook.url) {
        Ok(url) => url,
        Err(err) => {
            record(conn, webhook.id, &event.event, DeliveryStatus::Error, None, None, Some(format!("invalid webhook url: {err}"))).await;
            return;
        }
    };

    let context = WebhookContext::new(webhook.id, event.workspace_id, webhook.id)
        .with_resource_type("workspace_event")
        .with_metadata(event.data.clone());

    let mut request = WebhookRequest::new(url, event.event.clone(), format!("{} event", event.event), context)
        .with_timeout(DELIVERY_TIMEOUT);
    if let Some(secret) = &webhook.secret_hash {
        request = request.with_secret(secret.clone());
    }

    let started = Instant::now();
    let outcome = webhooks.deliver(&request).await;
    let duration_ms = duration_as_millis(started);

    match outcome {
        Ok(response) if response.is_success() => {
            record(conn, webhook.id, &event.event, DeliveryStatus::Ok, Some(i32::from(response.status_code)), Some(duration_ms), None).await;
            if let Err(err) = conn.record_webhook_success(webhook.id).await {
                tracing::warn!(target: TRACING_TARGET, error = %err, webhook_id = %webhook.id, "failed to record webhook success");
            }
        }
        Ok(response) => {
            let message = format!("endpoint responded with status {}", response.status_code);
            record(conn, webhook.id, &event.event, DeliveryStatus::Failed, Some(i32::from(response.status_code)), Some(duration_ms), Some(message)).await;
            disable_on_threshold(conn, webhook.id).await;
        }
        Err(err) => {
            let message = err.to_string();
            let status = if message.contains("timed out") {
                DeliveryStatus::Timeout
            } else {
                DeliveryStatus::Failed
            };
            record(conn, webhook.id, &event.event, status, None, Some(duration_ms), Some(message)).await;
            disable_on_threshold(conn, webhook.id).await;
        }
    }
}

fn duration_as_millis(started: Instant) -> i32 {
    started.elapsed().as_millis().min(i32::MAX as u128) as i32
}

async fn record(
    conn: &mut PgConnection,
    webhook_id: uuid::Uuid,
    event: &str,
    status: DeliveryStatus,
    response_code: Option<i32>,
    duration_ms: Option<i32>,
    error: Option<String>,
) {
    let new_delivery = NewWebhookDelivery {
        webhook_id,
        event: event.to_owned(),
        status,
        response_code,
        duration_ms,
        error,
    };
    if let Err(err) = conn.record_delivery(new_delivery).await {
        tracing::warn!(target: TRACING_TARGET, error = %err, webhook_id = %webhook_id, "failed to record webhook delivery");
    }
}

async fn disable_on_threshold(conn: &mut PgConnection, webhook_id: uuid::Uuid) {
    if let Err(err) = conn.record_webhook_failure(webhook_id).await {
        tracing::warn!(target: TRACING_TARGET, error = %err, webhook_id = %webhook_id, "failed to record webhook failure");
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use wsp_postgres::types::CapabilityScopeType;

    use super::*;

    fn webhook() -> Webhook {
        Webhook {
            id: Uuid::now_v7(),
            workspace_id: Uuid::now_v7(),
            scope_type: CapabilityScopeType::Workspace,
            scope_path: None,
            url: "https://example.com/hook".into(),
            events: vec![Some("file".into())],
            secret_hash: Some("sekret".into()),
            recursive: false,
            failure_count: 0,
            disabled_at: None,
            last_triggered_at: None,
            created_at: jiff::Timestamp::now().into(),
            deleted_at: None,
        }
    }

    #[test]
    fn matching_webhook_subscribes_and_scopes() {
        let w = webhook();
        assert!(w.subscribes_to("file.created"));
        assert!(w.matches_scope("/anything"));
    }

    #[test]
    fn non_matching_category_is_filtered_out() {
        let w = webhook();
        assert!(!w.subscribes_to("task.created"));
    }
}
