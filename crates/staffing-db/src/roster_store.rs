//! Writes to the `project_employees` join table.
//!
//! Only the coordinator's transaction writes here. Removals are a single
//! `DELETE ... = ANY`, additions a single UNNEST insert, so a diff of any
//! size costs two round-trips.

use sqlx::PgConnection;
use staffing_roster::{RosterDiff, RosterError, RosterStore};
use staffing_types::{Employee, ProjectId};
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PgTransaction;
use crate::rows::{EmployeeRow, decode_all};

/// The `project_employees` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgRosterStore;

impl PgRosterStore {
    /// Every member of the project, including inactive employees.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn members(
        conn: &mut PgConnection,
        project_id: ProjectId,
    ) -> Result<Vec<Employee>, DbError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r"SELECT e.id, e.name, e.status::TEXT AS status
              FROM project_employees pe
              JOIN employees e ON e.id = pe.employee_id
              WHERE pe.project_id = $1
              ORDER BY e.name, e.id",
        )
        .bind(project_id.into_inner())
        .fetch_all(conn)
        .await?;

        decode_all(rows)
    }

    /// Delete and insert membership rows according to `diff`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if either statement fails, including a
    /// primary-key violation for an addition that is already present.
    pub async fn apply(
        conn: &mut PgConnection,
        project_id: ProjectId,
        diff: &RosterDiff,
    ) -> Result<(), DbError> {
        if !diff.to_remove.is_empty() {
            let removed: Vec<Uuid> = diff.to_remove.iter().map(|id| id.into_inner()).collect();
            sqlx::query(
                r"DELETE FROM project_employees
                  WHERE project_id = $1 AND employee_id = ANY($2)",
            )
            .bind(project_id.into_inner())
            .bind(&removed)
            .execute(&mut *conn)
            .await?;
        }

        if !diff.to_add.is_empty() {
            let added: Vec<Uuid> = diff.to_add.iter().map(|id| id.into_inner()).collect();
            sqlx::query(
                r"INSERT INTO project_employees (project_id, employee_id)
                  SELECT $1::UUID, employee_id FROM UNNEST($2::UUID[]) AS t(employee_id)",
            )
            .bind(project_id.into_inner())
            .bind(&added)
            .execute(&mut *conn)
            .await?;
        }

        tracing::debug!(
            project_id = %project_id,
            added = diff.to_add.len(),
            removed = diff.to_remove.len(),
            "Applied roster diff"
        );
        Ok(())
    }
}

impl RosterStore<PgTransaction> for PgRosterStore {
    async fn load_members(
        &self,
        tx: &mut PgTransaction,
        project_id: ProjectId,
    ) -> Result<Vec<Employee>, RosterError> {
        Ok(Self::members(tx.conn(), project_id).await?)
    }

    async fn apply_diff(
        &self,
        tx: &mut PgTransaction,
        project_id: ProjectId,
        diff: &RosterDiff,
    ) -> Result<(), RosterError> {
        Ok(Self::apply(tx.conn(), project_id, diff).await?)
    }
}
