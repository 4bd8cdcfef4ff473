//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Projects, employees, log entries, and actors each get their own id type
//! so a project id can never be passed where an employee id is expected.
//! All ids use UUID v7 (time-ordered) when generated app-side.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            /// Whether this is the all-zero (nil) UUID.
            pub const fn is_nil(self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a project.
    ProjectId
}

define_id! {
    /// Unique identifier for an employee.
    EmployeeId
}

define_id! {
    /// Unique identifier for a membership log entry.
    MembershipLogEntryId
}

define_id! {
    /// Opaque identifier of the user performing a roster change.
    ///
    /// Authentication happens upstream; the roster subsystem only records it.
    ActorId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let project = ProjectId::new();
        let employee = EmployeeId::new();
        assert_ne!(project.into_inner(), Uuid::nil());
        assert_ne!(employee.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = EmployeeId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ProjectId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn nil_detection() {
        assert!(ActorId::from(Uuid::nil()).is_nil());
        assert!(!ActorId::new().is_nil());
    }
}
