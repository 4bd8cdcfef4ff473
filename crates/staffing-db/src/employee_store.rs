//! Employee resolution.
//!
//! Resolved rows are read `FOR SHARE`: an employee cannot be deactivated
//! while a reconciliation that is adding them is still open.

use std::collections::HashSet;

use sqlx::PgConnection;
use staffing_roster::{EmployeeResolver, RosterError};
use staffing_types::{Employee, EmployeeId};
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PgTransaction;
use crate::rows::{EmployeeRow, decode_all};

/// Resolves active employees from the `employees` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgEmployeeResolver;

impl PgEmployeeResolver {
    /// Fetch the active employees among `ids`. Unknown or inactive ids are
    /// simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_active(
        conn: &mut PgConnection,
        ids: &[Uuid],
    ) -> Result<Vec<Employee>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, EmployeeRow>(
            r"SELECT id, name, status::TEXT AS status
              FROM employees
              WHERE id = ANY($1) AND status = 'active'
              ORDER BY id
              FOR SHARE",
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;

        decode_all(rows)
    }
}

impl EmployeeResolver<PgTransaction> for PgEmployeeResolver {
    async fn resolve_employees(
        &self,
        tx: &mut PgTransaction,
        ids: &HashSet<EmployeeId>,
    ) -> Result<Vec<Employee>, RosterError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        let employees = Self::fetch_active(tx.conn(), &uuids).await?;

        let found: HashSet<EmployeeId> = employees.iter().map(|e| e.id).collect();
        let mut missing: Vec<EmployeeId> = ids.difference(&found).copied().collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            return Err(RosterError::EmployeesNotFound(missing));
        }

        tracing::debug!(count = employees.len(), "Resolved employees");
        Ok(employees)
    }
}
