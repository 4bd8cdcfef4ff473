//! Read-only roster queries.
//!
//! Plain joins over `project_employees`, filtered to active rows on both
//! sides. These run on the pool outside any reconciliation transaction and
//! therefore only ever see committed rosters.

use sqlx::PgPool;
use staffing_roster::{RosterError, RosterReader};
use staffing_types::{Employee, EmployeeId, MembershipLogEntry, Project, ProjectId};

use crate::error::DbError;
use crate::rows::{EmployeeRow, MembershipLogRow, ProjectRow, decode_all};

/// Read queries bound to a connection pool.
#[derive(Debug, Clone, Copy)]
pub struct PgRosterReader<'a> {
    pool: &'a PgPool,
}

impl<'a> PgRosterReader<'a> {
    /// Create a reader bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active employees on an active project.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_employees_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Employee>, DbError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r"SELECT e.id, e.name, e.status::TEXT AS status
              FROM project_employees pe
              JOIN projects p ON p.id = pe.project_id
              JOIN employees e ON e.id = pe.employee_id
              WHERE pe.project_id = $1
                AND p.status = 'active'
                AND e.status = 'active'
              ORDER BY e.name, e.id",
        )
        .bind(project_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        decode_all(rows)
    }

    /// Active projects an active employee belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_projects_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Project>, DbError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r"SELECT p.id, p.name, p.status::TEXT AS status
              FROM project_employees pe
              JOIN projects p ON p.id = pe.project_id
              JOIN employees e ON e.id = pe.employee_id
              WHERE pe.employee_id = $1
                AND p.status = 'active'
                AND e.status = 'active'
              ORDER BY p.name, p.id",
        )
        .bind(employee_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        decode_all(rows)
    }

    /// The full log for a project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_log_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MembershipLogEntry>, DbError> {
        let rows = sqlx::query_as::<_, MembershipLogRow>(
            r"SELECT id, project_id, employee_id, action::TEXT AS action, effective_date, description, actor_id, created_at
              FROM membership_log
              WHERE project_id = $1
              ORDER BY created_at, id",
        )
        .bind(project_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        decode_all(rows)
    }
}

impl RosterReader for PgRosterReader<'_> {
    async fn employees_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Employee>, RosterError> {
        Ok(self.get_employees_for_project(project_id).await?)
    }

    async fn projects_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Project>, RosterError> {
        Ok(self.get_projects_for_employee(employee_id).await?)
    }

    async fn membership_history(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MembershipLogEntry>, RosterError> {
        Ok(self.get_log_by_project(project_id).await?)
    }
}
