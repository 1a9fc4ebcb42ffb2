//! Database query repositories for all entities in the system.
//!
//! Each repository is a trait implemented directly on [`PgConnection`],
//! encapsulating the diesel query for one entity's CRUD and domain-specific
//! operations.
//!
//! [`PgConnection`]: crate::PgConnection

pub mod api_key;
pub mod append;
pub mod capability_key;
pub mod file;
pub mod rate_limit;
pub mod webhook;
pub mod webhook_delivery;
pub mod workspace;

pub use api_key::ApiKeyRepository;
pub use append::AppendRepository;
pub use capability_key::CapabilityKeyRepository;
pub use file::FileRepository;
pub use rate_limit::{RateLimitDecision, RateLimitRepository};
pub use webhook::WebhookRepository;
pub use webhook_delivery::WebhookDeliveryRepository;
pub use workspace::WorkspaceRepository;
