//! Request validation for roster reconciliation.
//!
//! Validation is explicit: a [`ReconcileRequest`] is checked by plain
//! functions before any transaction opens, so a rejected request never
//! touches a store.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use staffing_types::{ActorId, EmployeeId, ProjectId};

use crate::error::RosterError;

/// How repeated employee ids in a desired roster are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Silently collapse repeats; the diff is computed over the set.
    #[default]
    Deduplicate,
    /// Reject the request with a validation error.
    Reject,
}

/// A request to replace a project's roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    /// The project whose roster is replaced.
    pub project_id: ProjectId,
    /// The complete desired roster. Empty means "remove everyone".
    pub desired: Vec<EmployeeId>,
    /// The user requesting the change.
    pub actor_id: ActorId,
    /// Business date recorded on every log entry.
    pub effective_date: NaiveDate,
}

impl ReconcileRequest {
    /// Build a request.
    pub const fn new(
        project_id: ProjectId,
        desired: Vec<EmployeeId>,
        actor_id: ActorId,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            project_id,
            desired,
            actor_id,
            effective_date,
        }
    }
}

/// Turn the desired id list into a set according to `policy`.
///
/// # Errors
///
/// Returns [`RosterError::Validation`] if `policy` is
/// [`DuplicatePolicy::Reject`] and an id appears more than once.
pub fn normalize_desired(
    desired: &[EmployeeId],
    policy: DuplicatePolicy,
) -> Result<HashSet<EmployeeId>, RosterError> {
    let mut set = HashSet::with_capacity(desired.len());
    for id in desired {
        if !set.insert(*id) && policy == DuplicatePolicy::Reject {
            return Err(RosterError::Validation(format!(
                "employee {id} appears more than once in the desired roster"
            )));
        }
    }
    Ok(set)
}

/// Check every field of `request` that can be checked without a store.
///
/// Returns the normalized desired set.
///
/// # Errors
///
/// Returns [`RosterError::Validation`] for a nil project or actor id, a
/// nil employee id, or (under [`DuplicatePolicy::Reject`]) repeated ids.
pub fn validate_request(
    request: &ReconcileRequest,
    policy: DuplicatePolicy,
) -> Result<HashSet<EmployeeId>, RosterError> {
    if request.project_id.is_nil() {
        return Err(RosterError::Validation(String::from("project id must not be nil")));
    }
    if request.actor_id.is_nil() {
        return Err(RosterError::Validation(String::from("actor id must not be nil")));
    }
    if request.desired.iter().any(|id| id.is_nil()) {
        return Err(RosterError::Validation(String::from(
            "employee ids must not be nil",
        )));
    }
    normalize_desired(&request.desired, policy)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::error::RosterErrorKind;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default()
    }

    #[test]
    fn duplicates_collapse_by_default() {
        let a = EmployeeId::new();
        let set = normalize_desired(&[a, a, a], DuplicatePolicy::default());
        assert_eq!(set.map(|s| s.len()).ok(), Some(1));
    }

    #[test]
    fn duplicates_rejected_under_reject_policy() {
        let a = EmployeeId::new();
        let err = normalize_desired(&[a, EmployeeId::new(), a], DuplicatePolicy::Reject);
        assert!(matches!(err, Err(RosterError::Validation(msg)) if msg.contains(&a.to_string())));
    }

    #[test]
    fn empty_desired_is_valid() {
        let request = ReconcileRequest::new(ProjectId::new(), Vec::new(), ActorId::new(), date());
        let set = validate_request(&request, DuplicatePolicy::Reject);
        assert!(set.is_ok_and(|s| s.is_empty()));
    }

    #[test]
    fn nil_actor_is_rejected() {
        let request = ReconcileRequest::new(
            ProjectId::new(),
            vec![EmployeeId::new()],
            ActorId::from(Uuid::nil()),
            date(),
        );
        let err = validate_request(&request, DuplicatePolicy::Deduplicate).err();
        assert_eq!(err.map(|e| e.kind()), Some(RosterErrorKind::Validation));
    }

    #[test]
    fn nil_employee_is_rejected() {
        let request = ReconcileRequest::new(
            ProjectId::new(),
            vec![EmployeeId::from(Uuid::nil())],
            ActorId::new(),
            date(),
        );
        assert!(validate_request(&request, DuplicatePolicy::Deduplicate).is_err());
    }
}
