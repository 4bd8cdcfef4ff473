//! Membership audit log construction.
//!
//! One [`MembershipLogEntry`] is built per changed employee. Writers
//! ([`AuditLogWriter`]) only ever append, and always inside the caller's
//! transaction. There is no update or delete operation. A wrong change is
//! corrected by reconciling again, which appends compensating entries.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use staffing_types::{
    ActorId, Employee, MembershipAction, MembershipLogEntry, MembershipLogEntryId, Project,
};

use crate::error::RosterError;

/// Appends log entries inside an existing transaction.
///
/// Implementations must not begin or commit transactions of their own.
pub trait AuditLogWriter<Tx>: Send + Sync {
    /// Append `entries` in order.
    fn append(
        &self,
        tx: &mut Tx,
        entries: &[MembershipLogEntry],
    ) -> impl Future<Output = Result<(), RosterError>> + Send;
}

/// Fields shared by every entry written for one reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct LogContext<'a> {
    /// The project whose roster changed.
    pub project: &'a Project,
    /// The user requesting the change.
    pub actor_id: ActorId,
    /// Business date of the change.
    pub effective_date: NaiveDate,
    /// Write timestamp stamped on every entry.
    pub created_at: DateTime<Utc>,
}

/// Build one log entry per `(employee, action)` pair.
pub fn build_log_entries(
    context: &LogContext<'_>,
    changes: &[(&Employee, MembershipAction)],
) -> Vec<MembershipLogEntry> {
    changes
        .iter()
        .map(|(employee, action)| MembershipLogEntry {
            id: MembershipLogEntryId::new(),
            project_id: context.project.id,
            employee_id: employee.id,
            action: *action,
            effective_date: context.effective_date,
            description: describe_change(employee, context.project, *action),
            actor_id: context.actor_id,
            created_at: context.created_at,
        })
        .collect()
}

/// Human-readable description of a single change.
pub fn describe_change(employee: &Employee, project: &Project, action: MembershipAction) -> String {
    match action {
        MembershipAction::Added => {
            format!("{} added to project {}", employee.name, project.name)
        }
        MembershipAction::Removed => {
            format!("{} removed from project {}", employee.name, project.name)
        }
    }
}
