//! Workspace repository for managing tenant-boundary records.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{NewWorkspace, UpdateWorkspace, Workspace};
use crate::types::Pagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for workspace database operations.
pub trait WorkspaceRepository {
    /// Creates a new workspace.
    fn create_workspace(
        &mut self,
        new_workspace: NewWorkspace,
    ) -> impl Future<Output = PgResult<Workspace>> + Send;

    /// Finds a workspace by ID, excluding soft-deleted rows.
    fn find_workspace_by_id(
        &mut self,
        workspace_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Workspace>>> + Send;

    /// Lists workspaces, excluding soft-deleted rows.
    fn list_workspaces(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Workspace>>> + Send;

    /// Updates a workspace.
    fn update_workspace(
        &mut self,
        workspace_id: Uuid,
        changes: UpdateWorkspace,
    ) -> impl Future<Output = PgResult<Workspace>> + Send;

    /// Bumps `last_activity_at` to now. Called on every admitted request.
    fn touch_workspace_activity(
        &mut self,
        workspace_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Soft deletes a workspace.
    fn delete_workspace(&mut self, workspace_id: Uuid) -> impl Future<Output = PgResult<()>> + Send;
}

impl WorkspaceRepository for PgConnection {
    async fn create_workspace(&mut self, new_workspace: NewWorkspace) -> PgResult<Workspace> {
        use schema::workspaces;

        diesel::insert_into(workspaces::table)
            .values(&new_workspace)
            .returning(Workspace::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_workspace_by_id(&mut self, workspace_id: Uuid) -> PgResult<Option<Workspace>> {
        use schema::workspaces::dsl::*;

        workspaces
            .filter(id.eq(workspace_id))
            .filter(deleted_at.is_null())
            .select(Workspace::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_workspaces(&mut self, pagination: Pagination) -> PgResult<Vec<Workspace>> {
        use schema::workspaces::dsl::*;

        workspaces
            .filter(deleted_at.is_null())
            .select(Workspace::as_select())
            .order(created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_workspace(
        &mut self,
        workspace_id: Uuid,
        changes: UpdateWorkspace,
    ) -> PgResult<Workspace> {
        use schema::workspaces::dsl::*;

        diesel::update(workspaces)
            .filter(id.eq(workspace_id))
            .set(&changes)
            .returning(Workspace::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn touch_workspace_activity(&mut self, workspace_id: Uuid) -> PgResult<()> {
        use schema::workspaces::dsl::*;

        diesel::update(workspaces)
            .filter(id.eq(workspace_id))
            .set(last_activity_at.eq(jiff_diesel::Timestamp::from(Timestamp::now())))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn delete_workspace(&mut self, workspace_id: Uuid) -> PgResult<()> {
        use schema::workspaces::dsl::*;

        diesel::update(workspaces)
            .filter(id.eq(workspace_id))
            .set(deleted_at.eq(Some(jiff_diesel::Timestamp::from(Timestamp::now()))))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
