//! Seams between the coordinator and the stores it drives.
//!
//! The coordinator never opens connections or knows about SQL. It receives
//! a [`TransactionSource`] plus one implementation of each collaborator,
//! all parameterized over the same transaction type, so every step of a
//! reconciliation runs inside the same unit of work.
//!
//! Methods return `impl Future + Send` so implementations can be written
//! as plain `async fn` while the coordinator stays usable from
//! multi-threaded runtimes.

use std::collections::HashSet;
use std::future::Future;

use staffing_types::{Employee, EmployeeId, MembershipLogEntry, Project, ProjectId};

use crate::error::RosterError;
use crate::reconcile::RosterDiff;

/// An open unit of work.
///
/// Dropping a transaction without calling [`RosterTransaction::commit`]
/// discards every write made through it.
pub trait RosterTransaction: Send {
    /// Make every write in this transaction visible to other readers.
    fn commit(self) -> impl Future<Output = Result<(), RosterError>> + Send;
}

/// Something that can open transactions.
pub trait TransactionSource: Send + Sync {
    /// The transaction handle passed to every collaborator.
    type Tx: RosterTransaction;

    /// Open a new transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, RosterError>> + Send;
}

/// Resolves a project id to an active project.
pub trait ProjectResolver<Tx>: Send + Sync {
    /// Load the project and hold a lock on it until `tx` ends.
    ///
    /// Two transactions resolving the same project must not both proceed;
    /// the second waits until the first commits or rolls back.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::ProjectNotFound`] if the project is unknown,
    /// inactive, or excluded.
    fn resolve_project(
        &self,
        tx: &mut Tx,
        project_id: ProjectId,
    ) -> impl Future<Output = Result<Project, RosterError>> + Send;
}

/// Resolves employee ids to active employees.
pub trait EmployeeResolver<Tx>: Send + Sync {
    /// Resolve every id in `ids`. All-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::EmployeesNotFound`] listing every id that is
    /// unknown or not active.
    fn resolve_employees(
        &self,
        tx: &mut Tx,
        ids: &HashSet<EmployeeId>,
    ) -> impl Future<Output = Result<Vec<Employee>, RosterError>> + Send;
}

/// The persisted project/employee join.
pub trait RosterStore<Tx>: Send + Sync {
    /// Current members of the project, whatever their lifecycle status.
    ///
    /// Inactive members are included so they can still be removed.
    fn load_members(
        &self,
        tx: &mut Tx,
        project_id: ProjectId,
    ) -> impl Future<Output = Result<Vec<Employee>, RosterError>> + Send;

    /// Insert the added and delete the removed membership rows.
    fn apply_diff(
        &self,
        tx: &mut Tx,
        project_id: ProjectId,
        diff: &RosterDiff,
    ) -> impl Future<Output = Result<(), RosterError>> + Send;
}

/// Read-only roster queries.
///
/// Reads only ever observe committed reconciliations and never write.
pub trait RosterReader: Send + Sync {
    /// Active employees on an active project's roster.
    ///
    /// Returns an empty list for an unknown or inactive project.
    fn employees_for_project(
        &self,
        project_id: ProjectId,
    ) -> impl Future<Output = Result<Vec<Employee>, RosterError>> + Send;

    /// Active projects whose roster includes an active employee.
    fn projects_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> impl Future<Output = Result<Vec<Project>, RosterError>> + Send;

    /// Every log entry for a project, in creation order.
    fn membership_history(
        &self,
        project_id: ProjectId,
    ) -> impl Future<Output = Result<Vec<MembershipLogEntry>, RosterError>> + Send;
}
