//! Webhook trigger (component I): subscribes to the event bus and delivers
//! outbound webhooks for matching workspace events.

mod trigger;

pub use trigger::{TRACING_TARGET, spawn};
