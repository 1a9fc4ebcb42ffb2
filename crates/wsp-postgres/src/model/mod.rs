//! Database models for every entity in the admission/distribution plane.
//!
//! This module contains Diesel model definitions for all database tables,
//! including structs for querying, inserting, and updating records.

mod api_key;
mod append;
mod capability_key;
mod file;
mod rate_limit;
mod webhook;
mod webhook_delivery;
mod workspace;

pub use api_key::{ApiKey, NewApiKey, UpdateApiKey};
pub use append::{Append, NewAppend, UpdateAppend};
pub use capability_key::{CapabilityKey, NewCapabilityKey, UpdateCapabilityKey};
pub use file::{File, RETENTION_DAYS as FILE_RETENTION_DAYS};
pub use rate_limit::{NewRateLimit, RateLimit, UpdateRateLimit};
pub use webhook::{MAX_CONSECUTIVE_FAILURES, NewWebhook, UpdateWebhook, Webhook};
pub use webhook_delivery::{NewWebhookDelivery, RETENTION_DAYS, WebhookDelivery};
pub use workspace::{NewWorkspace, UpdateWorkspace, Workspace};
