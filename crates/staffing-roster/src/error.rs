//! Error types for roster reconciliation.
//!
//! Every failure aborts the enclosing transaction and reaches the caller
//! unmodified. [`RosterError::kind`] collapses the variants into the three
//! categories callers branch on.

use staffing_types::{EmployeeId, ProjectId};

/// Errors that can occur while reading or reconciling a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The project does not exist or is not active.
    #[error("project {0} not found or not active")]
    ProjectNotFound(ProjectId),

    /// One or more employees do not exist or are not active.
    #[error("employees not found or not active: {}", join_ids(.0))]
    EmployeesNotFound(Vec<EmployeeId>),

    /// The request was malformed.
    #[error("invalid roster request: {0}")]
    Validation(String),

    /// The underlying store failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Coarse category of a [`RosterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterErrorKind {
    /// A referenced project or employee is missing or inactive.
    NotFound,
    /// The request itself was rejected.
    Validation,
    /// A store or transaction failure.
    Persistence,
}

impl RosterError {
    /// The category of this error.
    pub const fn kind(&self) -> RosterErrorKind {
        match self {
            Self::ProjectNotFound(_) | Self::EmployeesNotFound(_) => RosterErrorKind::NotFound,
            Self::Validation(_) => RosterErrorKind::Validation,
            Self::Persistence(_) => RosterErrorKind::Persistence,
        }
    }
}

fn join_ids(ids: &[EmployeeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_every_missing_employee() {
        let a = EmployeeId::new();
        let b = EmployeeId::new();
        let msg = RosterError::EmployeesNotFound(vec![a, b]).to_string();
        assert!(msg.contains(&a.to_string()));
        assert!(msg.contains(&b.to_string()));
    }

    #[test]
    fn kinds() {
        assert_eq!(
            RosterError::ProjectNotFound(ProjectId::new()).kind(),
            RosterErrorKind::NotFound
        );
        assert_eq!(
            RosterError::Validation(String::from("x")).kind(),
            RosterErrorKind::Validation
        );
        assert_eq!(
            RosterError::Persistence(String::from("x")).kind(),
            RosterErrorKind::Persistence
        );
    }
}
