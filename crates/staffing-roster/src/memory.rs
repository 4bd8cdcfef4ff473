//! In-process roster backend.
//!
//! [`InMemoryRoster`] implements every collaborator trait over a single
//! shared state. A transaction takes the state lock for its whole
//! lifetime. Roster changes are staged per touched project and new log
//! entries are held back; commit writes both, drop throws them away.
//! Reconciliations are therefore fully serialized and readers only ever
//! see committed state.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

use staffing_types::{
    Employee, EmployeeId, LifecycleStatus, Membership, MembershipLogEntry, Project, ProjectId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::audit::AuditLogWriter;
use crate::collaborators::{
    EmployeeResolver, ProjectResolver, RosterReader, RosterStore, RosterTransaction,
    TransactionSource,
};
use crate::coordinator::RosterCoordinator;
use crate::error::RosterError;
use crate::reconcile::RosterDiff;

/// A coordinator whose every collaborator is the same [`InMemoryRoster`].
pub type InMemoryCoordinator =
    RosterCoordinator<InMemoryRoster, InMemoryRoster, InMemoryRoster, InMemoryRoster, InMemoryRoster>;

#[derive(Debug, Default)]
struct RosterState {
    projects: HashMap<ProjectId, Project>,
    employees: HashMap<EmployeeId, Employee>,
    memberships: BTreeSet<Membership>,
    logs: HashMap<ProjectId, Vec<MembershipLogEntry>>,
}

/// Every possible membership of one project, in join order.
fn project_range(project_id: ProjectId) -> RangeInclusive<Membership> {
    let bound = |raw: u128| Membership {
        project_id,
        employee_id: EmployeeId::from(Uuid::from_u128(raw)),
    };
    bound(u128::MIN)..=bound(u128::MAX)
}

impl RosterState {
    fn member_ids(&self, project_id: ProjectId) -> impl Iterator<Item = EmployeeId> + '_ {
        self.memberships
            .range(project_range(project_id))
            .map(|m| m.employee_id)
    }

    fn replace_roster(&mut self, project_id: ProjectId, roster: BTreeSet<EmployeeId>) {
        let stale: Vec<Membership> = self
            .memberships
            .range(project_range(project_id))
            .copied()
            .collect();
        for membership in stale {
            self.memberships.remove(&membership);
        }
        self.memberships
            .extend(roster.into_iter().map(|employee_id| Membership {
                project_id,
                employee_id,
            }));
    }
}

/// Shared in-memory roster store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    state: Arc<Mutex<RosterState>>,
}

impl InMemoryRoster {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A coordinator backed entirely by this store.
    pub fn coordinator(&self) -> InMemoryCoordinator {
        RosterCoordinator::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
        )
    }

    /// Insert or replace a project.
    pub async fn insert_project(&self, project: Project) {
        self.state.lock().await.projects.insert(project.id, project);
    }

    /// Insert or replace an employee.
    pub async fn insert_employee(&self, employee: Employee) {
        self.state
            .lock()
            .await
            .employees
            .insert(employee.id, employee);
    }

    /// Put an employee on a roster without writing a log entry.
    ///
    /// Intended for loading existing data, not for changing rosters.
    pub async fn seed_membership(&self, project_id: ProjectId, employee_id: EmployeeId) {
        self.state.lock().await.memberships.insert(Membership {
            project_id,
            employee_id,
        });
    }

    /// Change an employee's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::EmployeesNotFound`] for an unknown employee and
    /// [`RosterError::Validation`] for a transition the lifecycle forbids.
    pub async fn set_employee_status(
        &self,
        employee_id: EmployeeId,
        status: LifecycleStatus,
    ) -> Result<(), RosterError> {
        let mut state = self.state.lock().await;
        let employee = state
            .employees
            .get_mut(&employee_id)
            .ok_or_else(|| RosterError::EmployeesNotFound(vec![employee_id]))?;
        if !employee.status.can_transition_to(status) {
            return Err(RosterError::Validation(format!(
                "employee {employee_id} cannot move from {} to {status}",
                employee.status
            )));
        }
        employee.status = status;
        Ok(())
    }

    /// Change a project's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::ProjectNotFound`] for an unknown project and
    /// [`RosterError::Validation`] for a transition the lifecycle forbids.
    pub async fn set_project_status(
        &self,
        project_id: ProjectId,
        status: LifecycleStatus,
    ) -> Result<(), RosterError> {
        let mut state = self.state.lock().await;
        let project = state
            .projects
            .get_mut(&project_id)
            .ok_or(RosterError::ProjectNotFound(project_id))?;
        if !project.status.can_transition_to(status) {
            return Err(RosterError::Validation(format!(
                "project {project_id} cannot move from {} to {status}",
                project.status
            )));
        }
        project.status = status;
        Ok(())
    }

    /// Ids on a project's roster regardless of lifecycle status.
    pub async fn roster_ids(&self, project_id: ProjectId) -> BTreeSet<EmployeeId> {
        self.state.lock().await.member_ids(project_id).collect()
    }
}

/// A transaction over an [`InMemoryRoster`].
///
/// Holds the store lock until committed or dropped.
#[derive(Debug)]
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<RosterState>,
    staged_rosters: HashMap<ProjectId, BTreeSet<EmployeeId>>,
    pending_log: Vec<MembershipLogEntry>,
}

impl InMemoryTransaction {
    /// Roster ids as this transaction sees them.
    fn member_ids(&self, project_id: ProjectId) -> BTreeSet<EmployeeId> {
        self.staged_rosters
            .get(&project_id)
            .cloned()
            .unwrap_or_else(|| self.guard.member_ids(project_id).collect())
    }
}

impl RosterTransaction for InMemoryTransaction {
    async fn commit(self) -> Result<(), RosterError> {
        let Self {
            mut guard,
            staged_rosters,
            pending_log,
        } = self;
        for (project_id, roster) in staged_rosters {
            guard.replace_roster(project_id, roster);
        }
        for entry in pending_log {
            guard.logs.entry(entry.project_id).or_default().push(entry);
        }
        Ok(())
    }
}

impl TransactionSource for InMemoryRoster {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, RosterError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(InMemoryTransaction {
            guard,
            staged_rosters: HashMap::new(),
            pending_log: Vec::new(),
        })
    }
}

impl ProjectResolver<InMemoryTransaction> for InMemoryRoster {
    async fn resolve_project(
        &self,
        tx: &mut InMemoryTransaction,
        project_id: ProjectId,
    ) -> Result<Project, RosterError> {
        tx.guard
            .projects
            .get(&project_id)
            .filter(|p| p.status.is_active())
            .cloned()
            .ok_or(RosterError::ProjectNotFound(project_id))
    }
}

impl EmployeeResolver<InMemoryTransaction> for InMemoryRoster {
    async fn resolve_employees(
        &self,
        tx: &mut InMemoryTransaction,
        ids: &HashSet<EmployeeId>,
    ) -> Result<Vec<Employee>, RosterError> {
        let mut found = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match tx.guard.employees.get(id).filter(|e| e.status.is_active()) {
                Some(employee) => found.push(employee.clone()),
                None => missing.push(*id),
            }
        }
        if !missing.is_empty() {
            missing.sort_unstable();
            return Err(RosterError::EmployeesNotFound(missing));
        }
        Ok(found)
    }
}

impl RosterStore<InMemoryTransaction> for InMemoryRoster {
    async fn load_members(
        &self,
        tx: &mut InMemoryTransaction,
        project_id: ProjectId,
    ) -> Result<Vec<Employee>, RosterError> {
        tx.member_ids(project_id)
            .into_iter()
            .map(|id| {
                tx.guard.employees.get(&id).cloned().ok_or_else(|| {
                    RosterError::Persistence(format!(
                        "membership references unknown employee {id}"
                    ))
                })
            })
            .collect()
    }

    async fn apply_diff(
        &self,
        tx: &mut InMemoryTransaction,
        project_id: ProjectId,
        diff: &RosterDiff,
    ) -> Result<(), RosterError> {
        let mut roster = tx.member_ids(project_id);
        for employee_id in &diff.to_remove {
            roster.remove(employee_id);
        }
        roster.extend(diff.to_add.iter().copied());
        tx.staged_rosters.insert(project_id, roster);
        Ok(())
    }
}

impl AuditLogWriter<InMemoryTransaction> for InMemoryRoster {
    async fn append(
        &self,
        tx: &mut InMemoryTransaction,
        entries: &[MembershipLogEntry],
    ) -> Result<(), RosterError> {
        tx.pending_log.extend_from_slice(entries);
        Ok(())
    }
}

impl RosterReader for InMemoryRoster {
    async fn employees_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Employee>, RosterError> {
        let state = self.state.lock().await;
        if !state
            .projects
            .get(&project_id)
            .is_some_and(|p| p.status.is_active())
        {
            return Ok(Vec::new());
        }
        let mut employees: Vec<Employee> = state
            .member_ids(project_id)
            .filter_map(|id| state.employees.get(&id))
            .filter(|e| e.status.is_active())
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(employees)
    }

    async fn projects_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Project>, RosterError> {
        let state = self.state.lock().await;
        if !state
            .employees
            .get(&employee_id)
            .is_some_and(|e| e.status.is_active())
        {
            return Ok(Vec::new());
        }
        let mut projects: Vec<Project> = state
            .memberships
            .iter()
            .filter(|m| m.employee_id == employee_id)
            .filter_map(|m| state.projects.get(&m.project_id))
            .filter(|p| p.status.is_active())
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn membership_history(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MembershipLogEntry>, RosterError> {
        let state = self.state.lock().await;
        let mut entries = state.logs.get(&project_id).cloned().unwrap_or_default();
        entries.sort_by_key(|e| (e.created_at, e.id));
        Ok(entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn employee(name: &str) -> Employee {
        Employee {
            id: EmployeeId::new(),
            name: name.to_owned(),
            status: LifecycleStatus::Active,
        }
    }

    fn project(name: &str) -> Project {
        Project {
            id: ProjectId::new(),
            name: name.to_owned(),
            status: LifecycleStatus::Active,
        }
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryRoster::new();
        let p = project("Atlas");
        let a = employee("Ada");
        store.insert_project(p.clone()).await;
        store.insert_employee(a.clone()).await;

        {
            let mut tx = store.begin().await.unwrap();
            let diff = RosterDiff {
                to_add: BTreeSet::from([a.id]),
                to_remove: BTreeSet::new(),
            };
            assert!(store.apply_diff(&mut tx, p.id, &diff).await.is_ok());
        }

        assert!(store.roster_ids(p.id).await.is_empty());
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = InMemoryRoster::new();
        let p = project("Atlas");
        let a = employee("Ada");
        store.insert_project(p.clone()).await;
        store.insert_employee(a.clone()).await;

        let mut tx = store.begin().await.unwrap();
        let diff = RosterDiff {
            to_add: BTreeSet::from([a.id]),
            to_remove: BTreeSet::new(),
        };
        assert!(store.apply_diff(&mut tx, p.id, &diff).await.is_ok());
        assert!(tx.commit().await.is_ok());

        assert_eq!(store.roster_ids(p.id).await, BTreeSet::from([a.id]));
    }

    #[tokio::test]
    async fn dropped_transaction_discards_log_entries() {
        let store = InMemoryRoster::new();
        let p = project("Atlas");
        store.insert_project(p.clone()).await;

        {
            let mut tx = store.begin().await.unwrap();
            let entry = MembershipLogEntry {
                id: staffing_types::MembershipLogEntryId::new(),
                project_id: p.id,
                employee_id: EmployeeId::new(),
                action: staffing_types::MembershipAction::Added,
                effective_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                description: String::from("staged only"),
                actor_id: staffing_types::ActorId::new(),
                created_at: chrono::Utc::now(),
            };
            assert!(store.append(&mut tx, &[entry]).await.is_ok());
        }

        assert!(store.membership_history(p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_replaces_only_touched_rosters() {
        let store = InMemoryRoster::new();
        let (atlas, beacon) = (project("Atlas"), project("Beacon"));
        let (ada, bo) = (employee("Ada"), employee("Bo"));
        for p in [&atlas, &beacon] {
            store.insert_project(p.clone()).await;
        }
        for e in [&ada, &bo] {
            store.insert_employee(e.clone()).await;
        }
        store.seed_membership(atlas.id, ada.id).await;
        store.seed_membership(beacon.id, ada.id).await;

        let mut tx = store.begin().await.unwrap();
        let diff = RosterDiff {
            to_add: BTreeSet::from([bo.id]),
            to_remove: BTreeSet::from([ada.id]),
        };
        assert!(store.apply_diff(&mut tx, atlas.id, &diff).await.is_ok());
        let staged = store.load_members(&mut tx, atlas.id).await.unwrap();
        assert_eq!(staged, vec![bo.clone()]);
        assert!(tx.commit().await.is_ok());

        assert_eq!(store.roster_ids(atlas.id).await, BTreeSet::from([bo.id]));
        assert_eq!(store.roster_ids(beacon.id).await, BTreeSet::from([ada.id]));
    }

    #[tokio::test]
    async fn inactive_entities_do_not_resolve() {
        let store = InMemoryRoster::new();
        let p = project("Atlas");
        let a = employee("Ada");
        store.insert_project(p.clone()).await;
        store.insert_employee(a.clone()).await;
        assert!(store
            .set_employee_status(a.id, LifecycleStatus::Inactive)
            .await
            .is_ok());
        assert!(store
            .set_project_status(p.id, LifecycleStatus::Excluded)
            .await
            .is_ok());

        let mut tx = store.begin().await.unwrap();
        let project = store.resolve_project(&mut tx, p.id).await;
        assert!(matches!(project, Err(RosterError::ProjectNotFound(id)) if id == p.id));

        let employees = store
            .resolve_employees(&mut tx, &HashSet::from([a.id]))
            .await;
        assert!(matches!(employees, Err(RosterError::EmployeesNotFound(ids)) if ids == vec![a.id]));
    }

    #[tokio::test]
    async fn excluded_project_cannot_be_reactivated() {
        let store = InMemoryRoster::new();
        let p = project("Atlas");
        store.insert_project(p.clone()).await;
        assert!(store
            .set_project_status(p.id, LifecycleStatus::Excluded)
            .await
            .is_ok());
        let result = store.set_project_status(p.id, LifecycleStatus::Active).await;
        assert!(matches!(result, Err(RosterError::Validation(_))));
    }

    #[tokio::test]
    async fn reads_filter_inactive_rows() {
        let store = InMemoryRoster::new();
        let (live, paused) = (project("Live"), project("Paused"));
        let (ada, bo) = (employee("Ada"), employee("Bo"));
        for p in [&live, &paused] {
            store.insert_project(p.clone()).await;
        }
        for e in [&ada, &bo] {
            store.insert_employee(e.clone()).await;
            store.seed_membership(live.id, e.id).await;
            store.seed_membership(paused.id, e.id).await;
        }
        assert!(store
            .set_project_status(paused.id, LifecycleStatus::Inactive)
            .await
            .is_ok());
        assert!(store
            .set_employee_status(bo.id, LifecycleStatus::Inactive)
            .await
            .is_ok());

        let employees = store.employees_for_project(live.id).await.unwrap_or_default();
        assert_eq!(employees, vec![ada.clone()]);

        let projects = store.projects_for_employee(ada.id).await.unwrap_or_default();
        assert_eq!(projects, vec![live.clone()]);

        assert!(store
            .employees_for_project(paused.id)
            .await
            .unwrap_or_default()
            .is_empty());
        assert!(store
            .projects_for_employee(bo.id)
            .await
            .unwrap_or_default()
            .is_empty());
    }
}
