//! Row types and their mapping to domain types.
//!
//! Enum columns are selected as `::TEXT` and parsed here, so an unexpected
//! label is a [`DbError::Decode`] rather than a panic.

use chrono::{DateTime, NaiveDate, Utc};
use staffing_types::{Employee, MembershipLogEntry, Project};
use uuid::Uuid;

use crate::error::DbError;

/// A row from the `projects` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    /// Project UUID.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Lifecycle status as a string (cast from `PostgreSQL` enum).
    pub status: String,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DbError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            status: row.status.parse()?,
        })
    }
}

/// A row from the `employees` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeRow {
    /// Employee UUID.
    pub id: Uuid,
    /// Employee name.
    pub name: String,
    /// Lifecycle status as a string (cast from `PostgreSQL` enum).
    pub status: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = DbError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            status: row.status.parse()?,
        })
    }
}

/// A row from the `membership_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MembershipLogRow {
    /// Entry UUID.
    pub id: Uuid,
    /// Project UUID.
    pub project_id: Uuid,
    /// Employee UUID.
    pub employee_id: Uuid,
    /// Action as a string (cast from `PostgreSQL` enum).
    pub action: String,
    /// Business date of the change.
    pub effective_date: NaiveDate,
    /// Human-readable description.
    pub description: String,
    /// Acting user UUID.
    pub actor_id: Uuid,
    /// Write timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MembershipLogRow> for MembershipLogEntry {
    type Error = DbError;

    fn try_from(row: MembershipLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            project_id: row.project_id.into(),
            employee_id: row.employee_id.into(),
            action: row.action.parse()?,
            effective_date: row.effective_date,
            description: row.description,
            actor_id: row.actor_id.into(),
            created_at: row.created_at,
        })
    }
}

/// Map every row, failing on the first undecodable one.
pub fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DbError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}
