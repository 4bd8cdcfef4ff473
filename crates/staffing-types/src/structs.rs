//! Core entity structs for project staffing.
//!
//! Projects and employees are independent entities. Which employee belongs
//! to which project is an explicit join ([`Membership`]), never an embedded
//! object reference, so neither side owns the other.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{LifecycleStatus, MembershipAction};
use crate::ids::{ActorId, EmployeeId, MembershipLogEntryId, ProjectId};

/// A project that employees can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Human-readable project name.
    pub name: String,
    /// Soft-delete lifecycle status.
    pub status: LifecycleStatus,
}

/// An employee that can be assigned to projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: EmployeeId,
    /// Human-readable employee name.
    pub name: String,
    /// Soft-delete lifecycle status.
    pub status: LifecycleStatus,
}

/// One row of the project/employee join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Membership {
    /// The project side of the pair.
    pub project_id: ProjectId,
    /// The employee side of the pair.
    pub employee_id: EmployeeId,
}

/// A project together with its current roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoster {
    /// The project.
    pub project: Project,
    /// Employees on the roster, sorted by name then id.
    pub members: Vec<Employee>,
}

impl ProjectRoster {
    /// Build a roster, sorting members into their canonical order.
    pub fn new(project: Project, mut members: Vec<Employee>) -> Self {
        members.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Self { project, members }
    }

    /// Ids of every member, in roster order.
    pub fn member_ids(&self) -> Vec<EmployeeId> {
        self.members.iter().map(|e| e.id).collect()
    }

    /// Whether the given employee is on the roster.
    pub fn contains(&self, employee_id: EmployeeId) -> bool {
        self.members.iter().any(|e| e.id == employee_id)
    }
}

/// An immutable record of one roster change.
///
/// Entries are append-only: they are never updated or deleted. Corrections
/// are made by a later reconciliation, which appends its own entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipLogEntry {
    /// Unique entry identifier.
    pub id: MembershipLogEntryId,
    /// The project whose roster changed.
    pub project_id: ProjectId,
    /// The employee who was added or removed.
    pub employee_id: EmployeeId,
    /// Whether the employee was added or removed.
    pub action: MembershipAction,
    /// Business date from which the change applies.
    pub effective_date: NaiveDate,
    /// Human-readable description naming the employee and project.
    pub description: String,
    /// The user who requested the change.
    pub actor_id: ActorId,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}
