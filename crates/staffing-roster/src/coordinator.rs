//! Transaction coordination for roster reconciliation.
//!
//! [`RosterCoordinator::reconcile_roster`] is the only write path into the
//! roster and the membership log. One call runs, in a single transaction:
//!
//! ```text
//! begin
//!   |
//!   +-- resolve + lock project      (ProjectResolver)
//!   +-- load current members        (RosterStore)
//!   +-- resolve desired employees   (EmployeeResolver)
//!   +-- diff current vs desired     (reconcile::diff_roster)
//!   +-- apply diff                  (RosterStore)
//!   +-- append one entry per change (AuditLogWriter)
//!   |
//! commit
//! ```
//!
//! Any error returns early, dropping the transaction, which rolls back
//! everything written so far. Nothing is retried.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use staffing_types::{Employee, EmployeeId, MembershipAction, ProjectRoster};

use crate::audit::{AuditLogWriter, LogContext, build_log_entries};
use crate::collaborators::{
    EmployeeResolver, ProjectResolver, RosterStore, RosterTransaction, TransactionSource,
};
use crate::error::RosterError;
use crate::reconcile::{RosterDiff, diff_roster};
use crate::validation::{DuplicatePolicy, ReconcileRequest, validate_request};

/// Replaces project rosters atomically and records every change.
///
/// Every dependency is passed in explicitly. All collaborators share the
/// transaction type of the [`TransactionSource`].
#[derive(Debug, Clone)]
pub struct RosterCoordinator<S, P, E, R, W> {
    source: S,
    projects: P,
    employees: E,
    roster: R,
    audit: W,
    duplicate_policy: DuplicatePolicy,
}

impl<S, P, E, R, W> RosterCoordinator<S, P, E, R, W>
where
    S: TransactionSource,
    P: ProjectResolver<S::Tx>,
    E: EmployeeResolver<S::Tx>,
    R: RosterStore<S::Tx>,
    W: AuditLogWriter<S::Tx>,
{
    /// Create a coordinator that deduplicates repeated ids.
    pub const fn new(source: S, projects: P, employees: E, roster: R, audit: W) -> Self {
        Self {
            source,
            projects,
            employees,
            roster,
            audit,
            duplicate_policy: DuplicatePolicy::Deduplicate,
        }
    }

    /// Set how repeated ids in a desired roster are treated.
    #[must_use]
    pub const fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Replace a project's roster with `request.desired`.
    ///
    /// Returns the project with its roster as committed. Reconciling to the
    /// roster the project already has succeeds without writing anything.
    ///
    /// # Errors
    ///
    /// - [`RosterError::Validation`] if the request is malformed.
    /// - [`RosterError::ProjectNotFound`] if the project is missing or not
    ///   active.
    /// - [`RosterError::EmployeesNotFound`] if any desired employee is
    ///   missing or not active.
    /// - [`RosterError::Persistence`] if any store operation fails.
    ///
    /// In every error case neither the roster nor the log has changed.
    pub async fn reconcile_roster(
        &self,
        request: &ReconcileRequest,
    ) -> Result<ProjectRoster, RosterError> {
        let result = self.reconcile_in_transaction(request).await;
        if let Err(e) = &result {
            tracing::warn!(
                project_id = %request.project_id,
                actor_id = %request.actor_id,
                error = %e,
                "Roster reconciliation aborted"
            );
        }
        result
    }

    async fn reconcile_in_transaction(
        &self,
        request: &ReconcileRequest,
    ) -> Result<ProjectRoster, RosterError> {
        let desired = validate_request(request, self.duplicate_policy)?;

        let mut tx = self.source.begin().await?;

        let project = self
            .projects
            .resolve_project(&mut tx, request.project_id)
            .await?;
        let current_members = self.roster.load_members(&mut tx, project.id).await?;

        let resolved = self.employees.resolve_employees(&mut tx, &desired).await?;
        ensure_all_resolved(&desired, &resolved)?;

        let current: HashSet<EmployeeId> = current_members.iter().map(|e| e.id).collect();
        let diff = diff_roster(&current, &desired);

        if diff.is_empty() {
            tx.commit().await?;
            tracing::debug!(
                project_id = %project.id,
                members = current.len(),
                "Roster already matches desired roster"
            );
            return Ok(ProjectRoster::new(project, resolved));
        }

        self.roster.apply_diff(&mut tx, project.id, &diff).await?;

        let changes = collect_changes(&diff, &resolved, &current_members)?;
        let context = LogContext {
            project: &project,
            actor_id: request.actor_id,
            effective_date: request.effective_date,
            created_at: Utc::now(),
        };
        let entries = build_log_entries(&context, &changes);
        self.audit.append(&mut tx, &entries).await?;

        tx.commit().await?;

        tracing::info!(
            project_id = %project.id,
            actor_id = %request.actor_id,
            added = diff.to_add.len(),
            removed = diff.to_remove.len(),
            "Roster reconciled"
        );

        Ok(ProjectRoster::new(project, resolved))
    }
}

/// Guard against a resolver that silently drops ids.
fn ensure_all_resolved(
    desired: &HashSet<EmployeeId>,
    resolved: &[Employee],
) -> Result<(), RosterError> {
    let found: HashSet<EmployeeId> = resolved.iter().map(|e| e.id).collect();
    let mut missing: Vec<EmployeeId> = desired.difference(&found).copied().collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    Err(RosterError::EmployeesNotFound(missing))
}

/// Pair every changed id with its employee record and action.
///
/// Additions come from the resolved desired set, removals from the current
/// members, so removing an employee who has since gone inactive still
/// names them.
fn collect_changes<'a>(
    diff: &RosterDiff,
    resolved: &'a [Employee],
    current_members: &'a [Employee],
) -> Result<Vec<(&'a Employee, MembershipAction)>, RosterError> {
    let by_id: HashMap<EmployeeId, &Employee> = resolved
        .iter()
        .chain(current_members)
        .map(|e| (e.id, e))
        .collect();

    let lookup = |id: &EmployeeId| {
        by_id
            .get(id)
            .copied()
            .ok_or_else(|| RosterError::EmployeesNotFound(vec![*id]))
    };

    let mut changes = Vec::with_capacity(diff.change_count());
    for id in &diff.to_add {
        changes.push((lookup(id)?, MembershipAction::Added));
    }
    for id in &diff.to_remove {
        changes.push((lookup(id)?, MembershipAction::Removed));
    }
    Ok(changes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use staffing_types::{
        ActorId, LifecycleStatus, MembershipLogEntry, Project, ProjectId,
    };

    use super::*;
    use crate::collaborators::RosterReader;
    use crate::error::RosterErrorKind;
    use crate::history::replay_log;
    use crate::memory::{InMemoryRoster, InMemoryTransaction};

    struct Fixture {
        store: InMemoryRoster,
        project: Project,
        staff: Vec<Employee>,
    }

    impl Fixture {
        /// A project with `roster` of the `staff` already assigned.
        async fn new(names: &[&str], roster: &[usize]) -> Self {
            let store = InMemoryRoster::new();
            let project = Project {
                id: ProjectId::new(),
                name: "Lighthouse".to_owned(),
                status: LifecycleStatus::Active,
            };
            store.insert_project(project.clone()).await;

            let mut staff = Vec::new();
            for name in names {
                let employee = Employee {
                    id: EmployeeId::new(),
                    name: (*name).to_owned(),
                    status: LifecycleStatus::Active,
                };
                store.insert_employee(employee.clone()).await;
                staff.push(employee);
            }
            for index in roster {
                let id = staff.get(*index).map(|e| e.id).unwrap();
                store.seed_membership(project.id, id).await;
            }
            Self {
                store,
                project,
                staff,
            }
        }

        fn id(&self, index: usize) -> EmployeeId {
            self.staff.get(index).map(|e| e.id).unwrap()
        }

        fn request(&self, desired: Vec<EmployeeId>) -> ReconcileRequest {
            ReconcileRequest::new(
                self.project.id,
                desired,
                ActorId::new(),
                NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            )
        }

        async fn roster(&self) -> BTreeSet<EmployeeId> {
            self.store.roster_ids(self.project.id).await
        }

        async fn log(&self) -> Vec<MembershipLogEntry> {
            self.store.membership_history(self.project.id).await.unwrap()
        }
    }

    fn actions(log: &[MembershipLogEntry]) -> BTreeSet<(EmployeeId, MembershipAction)> {
        log.iter().map(|e| (e.employee_id, e.action)).collect()
    }

    #[tokio::test]
    async fn swap_member_adds_and_removes() {
        let fx = Fixture::new(&["A", "B", "C"], &[0, 1]).await;
        let (a, b, c) = (fx.id(0), fx.id(1), fx.id(2));

        let result = fx
            .store
            .coordinator()
            .reconcile_roster(&fx.request(vec![b, c]))
            .await
            .unwrap();

        assert_eq!(result.member_ids(), vec![b, c]);
        assert_eq!(fx.roster().await, BTreeSet::from([b, c]));
        assert_eq!(
            actions(&fx.log().await),
            BTreeSet::from([(c, MembershipAction::Added), (a, MembershipAction::Removed)])
        );
    }

    #[tokio::test]
    async fn unchanged_roster_writes_nothing() {
        let fx = Fixture::new(&["A"], &[0]).await;
        let a = fx.id(0);

        let result = fx
            .store
            .coordinator()
            .reconcile_roster(&fx.request(vec![a]))
            .await
            .unwrap();

        assert_eq!(result.member_ids(), vec![a]);
        assert_eq!(fx.roster().await, BTreeSet::from([a]));
        assert!(fx.log().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_employee_changes_nothing() {
        let fx = Fixture::new(&["A", "B"], &[0]).await;
        let stranger = EmployeeId::new();

        let err = fx
            .store
            .coordinator()
            .reconcile_roster(&fx.request(vec![fx.id(1), stranger]))
            .await
            .unwrap_err();

        assert!(matches!(&err, RosterError::EmployeesNotFound(ids) if *ids == vec![stranger]));
        assert_eq!(err.kind(), RosterErrorKind::NotFound);
        assert_eq!(fx.roster().await, BTreeSet::from([fx.id(0)]));
        assert!(fx.log().await.is_empty());
    }

    #[tokio::test]
    async fn empty_desired_removes_every_member() {
        let fx = Fixture::new(&["A", "B", "C"], &[0, 1, 2]).await;

        let result = fx
            .store
            .coordinator()
            .reconcile_roster(&fx.request(Vec::new()))
            .await
            .unwrap();

        assert!(result.members.is_empty());
        assert!(fx.roster().await.is_empty());
        let log = fx.log().await;
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|e| e.action == MembershipAction::Removed));
    }

    #[tokio::test]
    async fn second_identical_reconcile_is_a_no_op() {
        let fx = Fixture::new(&["A", "B", "C"], &[0]).await;
        let coordinator = fx.store.coordinator();
        let request = fx.request(vec![fx.id(1), fx.id(2)]);

        let first = coordinator.reconcile_roster(&request).await.unwrap();
        let after_first = fx.log().await.len();
        let second = coordinator.reconcile_roster(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(after_first, 3);
        assert_eq!(fx.log().await.len(), after_first);
    }

    #[tokio::test]
    async fn log_entries_carry_request_metadata() {
        let fx = Fixture::new(&["Ada"], &[]).await;
        let request = fx.request(vec![fx.id(0)]);

        fx.store
            .coordinator()
            .reconcile_roster(&request)
            .await
            .unwrap();

        let log = fx.log().await;
        let entry = log.first().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(entry.actor_id, request.actor_id);
        assert_eq!(entry.effective_date, request.effective_date);
        assert_eq!(entry.project_id, fx.project.id);
        assert_eq!(entry.description, "Ada added to project Lighthouse");
    }

    #[tokio::test]
    async fn missing_or_inactive_project_is_not_found() {
        let fx = Fixture::new(&["A"], &[]).await;
        let coordinator = fx.store.coordinator();

        let mut request = fx.request(vec![fx.id(0)]);
        request.project_id = ProjectId::new();
        let err = coordinator.reconcile_roster(&request).await.unwrap_err();
        assert!(matches!(err, RosterError::ProjectNotFound(_)));

        fx.store
            .set_project_status(fx.project.id, LifecycleStatus::Inactive)
            .await
            .unwrap();
        let err = coordinator
            .reconcile_roster(&fx.request(vec![fx.id(0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::ProjectNotFound(id) if id == fx.project.id));
        assert!(fx.roster().await.is_empty());
    }

    #[tokio::test]
    async fn inactive_member_can_still_be_removed() {
        let fx = Fixture::new(&["Gone", "Stays"], &[0, 1]).await;
        fx.store
            .set_employee_status(fx.id(0), LifecycleStatus::Inactive)
            .await
            .unwrap();

        fx.store
            .coordinator()
            .reconcile_roster(&fx.request(vec![fx.id(1)]))
            .await
            .unwrap();

        let log = fx.log().await;
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.first().map(|e| e.description.as_str()),
            Some("Gone removed from project Lighthouse")
        );
    }

    #[tokio::test]
    async fn inactive_employee_cannot_be_added() {
        let fx = Fixture::new(&["A", "B"], &[0]).await;
        fx.store
            .set_employee_status(fx.id(1), LifecycleStatus::Inactive)
            .await
            .unwrap();

        let err = fx
            .store
            .coordinator()
            .reconcile_roster(&fx.request(vec![fx.id(0), fx.id(1)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), RosterErrorKind::NotFound);
        assert_eq!(fx.roster().await, BTreeSet::from([fx.id(0)]));
    }

    #[tokio::test]
    async fn duplicates_follow_policy() {
        let fx = Fixture::new(&["A"], &[]).await;
        let a = fx.id(0);

        let err = fx
            .store
            .coordinator()
            .with_duplicate_policy(DuplicatePolicy::Reject)
            .reconcile_roster(&fx.request(vec![a, a]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), RosterErrorKind::Validation);
        assert!(fx.log().await.is_empty());

        fx.store
            .coordinator()
            .reconcile_roster(&fx.request(vec![a, a]))
            .await
            .unwrap();
        assert_eq!(fx.log().await.len(), 1);
    }

    /// Audit writer whose table is unavailable.
    struct BrokenLog;

    impl AuditLogWriter<InMemoryTransaction> for BrokenLog {
        async fn append(
            &self,
            _tx: &mut InMemoryTransaction,
            _entries: &[MembershipLogEntry],
        ) -> Result<(), RosterError> {
            Err(RosterError::Persistence(String::from("membership_log unavailable")))
        }
    }

    #[tokio::test]
    async fn log_failure_rolls_back_roster_change() {
        let fx = Fixture::new(&["A", "B"], &[0]).await;
        let store = &fx.store;
        let coordinator = RosterCoordinator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            BrokenLog,
        );

        let err = coordinator
            .reconcile_roster(&fx.request(vec![fx.id(1)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), RosterErrorKind::Persistence);
        assert_eq!(fx.roster().await, BTreeSet::from([fx.id(0)]));
        assert!(fx.log().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reconciliations_do_not_lose_updates() {
        let fx = Fixture::new(&["A", "B", "C", "D"], &[]).await;
        let coordinator = Arc::new(fx.store.coordinator());

        let desired_sets = [
            vec![fx.id(1)],
            vec![fx.id(2), fx.id(3)],
            vec![fx.id(0), fx.id(3)],
            Vec::new(),
            vec![fx.id(1), fx.id(2)],
        ];

        let mut handles = Vec::new();
        for desired in desired_sets {
            let coordinator = Arc::clone(&coordinator);
            let request = fx.request(desired);
            handles.push(tokio::spawn(async move {
                coordinator.reconcile_roster(&request).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        // Every call diffed against the roster the previous one committed,
        // so replaying the whole log lands on the final roster.
        let log = fx.log().await;
        assert_eq!(replay_log(&log), fx.roster().await);
    }
}
