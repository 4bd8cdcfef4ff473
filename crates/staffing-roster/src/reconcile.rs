//! Membership reconciliation.
//!
//! Pure set arithmetic: given the roster as it is and the roster as the
//! caller wants it, compute the minimal additions and removals. Nothing in
//! this module touches a store.
//!
//! ```
//! use std::collections::HashSet;
//! use staffing_roster::reconcile::diff_roster;
//! use staffing_types::EmployeeId;
//!
//! let (a, b, c) = (EmployeeId::new(), EmployeeId::new(), EmployeeId::new());
//! let current = HashSet::from([a, b]);
//! let desired = HashSet::from([b, c]);
//!
//! let diff = diff_roster(&current, &desired);
//! assert!(diff.to_add.contains(&c));
//! assert!(diff.to_remove.contains(&a));
//! assert_eq!(diff.change_count(), 2);
//! ```

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

use staffing_types::EmployeeId;

/// The changes needed to move a roster from its current to its desired state.
///
/// `to_add` and `to_remove` are always disjoint. Both are ordered so the log
/// entries written from them come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    /// Employees in the desired roster but not the current one.
    pub to_add: BTreeSet<EmployeeId>,
    /// Employees in the current roster but not the desired one.
    pub to_remove: BTreeSet<EmployeeId>,
}

impl RosterDiff {
    /// Whether the current roster already equals the desired roster.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Number of membership changes, i.e. the number of log entries the
    /// diff produces.
    pub fn change_count(&self) -> usize {
        self.to_add.len().saturating_add(self.to_remove.len())
    }

    /// Apply the diff to a roster, returning the resulting roster.
    pub fn apply<S>(&self, current: &HashSet<EmployeeId, S>) -> HashSet<EmployeeId, S>
    where
        S: BuildHasher + Default,
    {
        current
            .iter()
            .filter(|id| !self.to_remove.contains(id))
            .chain(self.to_add.iter())
            .copied()
            .collect()
    }
}

/// Compute `desired - current` and `current - desired`.
///
/// Linear in the size of both sets.
pub fn diff_roster<S: BuildHasher>(
    current: &HashSet<EmployeeId, S>,
    desired: &HashSet<EmployeeId, S>,
) -> RosterDiff {
    RosterDiff {
        to_add: desired.difference(current).copied().collect(),
        to_remove: current.difference(desired).copied().collect(),
    }
}
