//! Project resolution with row locking.
//!
//! The project row is selected `FOR UPDATE`, so a second reconciliation of
//! the same project blocks until the first commits or rolls back and then
//! diffs against the roster the first one left behind.

use sqlx::PgConnection;
use staffing_roster::{ProjectResolver, RosterError};
use staffing_types::{Project, ProjectId};

use crate::error::DbError;
use crate::postgres::PgTransaction;
use crate::rows::ProjectRow;

/// Resolves active projects from the `projects` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgProjectResolver;

impl PgProjectResolver {
    /// Lock the project row and return it, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn lock_project(
        conn: &mut PgConnection,
        project_id: ProjectId,
    ) -> Result<Option<Project>, DbError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r"SELECT id, name, status::TEXT AS status
              FROM projects
              WHERE id = $1
              FOR UPDATE",
        )
        .bind(project_id.into_inner())
        .fetch_optional(conn)
        .await?;

        row.map(Project::try_from).transpose()
    }
}

impl ProjectResolver<PgTransaction> for PgProjectResolver {
    async fn resolve_project(
        &self,
        tx: &mut PgTransaction,
        project_id: ProjectId,
    ) -> Result<Project, RosterError> {
        Self::lock_project(tx.conn(), project_id)
            .await?
            .filter(|p| p.status.is_active())
            .ok_or(RosterError::ProjectNotFound(project_id))
    }
}
