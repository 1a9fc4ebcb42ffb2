//! Prelude module for wsp-postgres.
//!
//! Re-exports the most commonly used types and traits so consuming crates can
//! pull them in with a single `use wsp_postgres::prelude::*;`.
//!
//! # Example
//!
//! ```rust,no_run
//! use wsp_postgres::prelude::*;
//!
//! # async fn example() -> PgResult<()> {
//! let config = PgConfig::new("postgresql://localhost/mydb");
//! let client = PgClient::new(config)?;
//! # Ok(())
//! # }
//! ```

pub use diesel::prelude::*;
pub use diesel_async::RunQueryDsl;

pub use crate::PgConnection;
pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientMigrationExt, PgConfig,
    PgConn, PgPoolStatus,
};
pub use crate::query::{
    ApiKeyRepository, AppendRepository, CapabilityKeyRepository, RateLimitDecision,
    RateLimitRepository, WebhookDeliveryRepository, WebhookRepository, WorkspaceRepository,
};
pub use crate::types::Pagination;
pub use crate::{PgError, PgResult};
