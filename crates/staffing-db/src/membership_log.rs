//! Append-only persistence for the `membership_log` table.
//!
//! Entries are inserted inside the caller's transaction with a single
//! UNNEST insert. This module exposes no update or delete, and the table's
//! triggers reject both.

use sqlx::PgConnection;
use staffing_roster::{AuditLogWriter, RosterError};
use staffing_types::MembershipLogEntry;
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PgTransaction;

/// Writer for the `membership_log` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgMembershipLog;

impl PgMembershipLog {
    /// Insert `entries` on `conn` without beginning or committing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(
        conn: &mut PgConnection,
        entries: &[MembershipLogEntry],
    ) -> Result<(), DbError> {
        if entries.is_empty() {
            return Ok(());
        }

        let len = entries.len();
        let mut ids: Vec<Uuid> = Vec::with_capacity(len);
        let mut project_ids: Vec<Uuid> = Vec::with_capacity(len);
        let mut employee_ids: Vec<Uuid> = Vec::with_capacity(len);
        let mut actions = Vec::with_capacity(len);
        let mut effective_dates = Vec::with_capacity(len);
        let mut descriptions = Vec::with_capacity(len);
        let mut actor_ids: Vec<Uuid> = Vec::with_capacity(len);
        let mut timestamps = Vec::with_capacity(len);

        for entry in entries {
            ids.push(entry.id.into_inner());
            project_ids.push(entry.project_id.into_inner());
            employee_ids.push(entry.employee_id.into_inner());
            actions.push(entry.action.as_db_str().to_owned());
            effective_dates.push(entry.effective_date);
            descriptions.push(entry.description.clone());
            actor_ids.push(entry.actor_id.into_inner());
            timestamps.push(entry.created_at);
        }

        sqlx::query(
            r"INSERT INTO membership_log (id, project_id, employee_id, action, effective_date, description, actor_id, created_at)
              SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::UUID[], $4::membership_action[], $5::DATE[], $6::TEXT[], $7::UUID[], $8::TIMESTAMPTZ[])",
        )
        .bind(&ids)
        .bind(&project_ids)
        .bind(&employee_ids)
        .bind(&actions)
        .bind(&effective_dates)
        .bind(&descriptions)
        .bind(&actor_ids)
        .bind(&timestamps)
        .execute(conn)
        .await?;

        tracing::debug!(count = len, "Appended membership log entries (batch UNNEST)");
        Ok(())
    }
}

impl AuditLogWriter<PgTransaction> for PgMembershipLog {
    async fn append(
        &self,
        tx: &mut PgTransaction,
        entries: &[MembershipLogEntry],
    ) -> Result<(), RosterError> {
        Ok(Self::insert(tx.conn(), entries).await?)
    }
}
