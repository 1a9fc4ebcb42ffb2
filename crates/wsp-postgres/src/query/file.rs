//! File repository: the one query this crate needs against the external
//! file-CRUD owner's table — the soft-delete reaper's hard-delete sweep.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::{Span, Timestamp};

use crate::model::FILE_RETENTION_DAYS;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for file database operations this crate owns.
pub trait FileRepository {
    /// Hard-deletes files soft-deleted more than [`FILE_RETENTION_DAYS`] ago.
    ///
    /// Dependent rows (appends referencing `file_id`) are expected to cascade
    /// or be cleaned up by the file-CRUD owner before this runs; this reaper
    /// only owns the `files` row itself.
    fn cleanup_deleted_files(&mut self) -> impl Future<Output = PgResult<u64>> + Send;
}

impl FileRepository for PgConnection {
    async fn cleanup_deleted_files(&mut self) -> PgResult<u64> {
        use schema::files::dsl::*;

        let cutoff = Timestamp::now() - Span::new().days(FILE_RETENTION_DAYS);
        let deleted = diesel::delete(files)
            .filter(deleted_at.lt(jiff_diesel::Timestamp::from(cutoff)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted as u64)
    }
}
