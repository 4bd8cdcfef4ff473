//! Enumeration types for project staffing.
//!
//! Both enums round-trip through the strings stored in `PostgreSQL`, so the
//! string mappings here are the canonical ones.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A string that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Lifecycle status
// ---------------------------------------------------------------------------

/// Soft-delete lifecycle shared by projects and employees.
///
/// Rows are never physically removed. Default reads only return
/// [`LifecycleStatus::Active`] rows.
///
/// Transitions:
///
/// | From | To |
/// |------|----|
/// | Active | Inactive, Excluded |
/// | Inactive | Active, Excluded |
/// | Excluded | (terminal) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Visible to default reads and eligible for roster changes.
    Active,
    /// Temporarily disabled; may be reactivated.
    Inactive,
    /// Soft-deleted. Never becomes visible again.
    Excluded,
}

impl LifecycleStatus {
    /// Whether rows with this status are visible to default reads.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether moving from `self` to `next` is a permitted transition.
    ///
    /// Staying in the same status is always permitted.
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Excluded, Self::Excluded)
            | (Self::Active | Self::Inactive, _) => true,
            (Self::Excluded, _) => false,
        }
    }

    /// The `PostgreSQL` enum label for this status.
    pub const fn as_db_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Excluded => "excluded",
        }
    }
}

impl FromStr for LifecycleStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "excluded" => Ok(Self::Excluded),
            other => Err(UnknownVariant {
                kind: "lifecycle status",
                value: other.to_owned(),
            }),
        }
    }
}

impl core::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

// ---------------------------------------------------------------------------
// Membership action
// ---------------------------------------------------------------------------

/// The kind of roster change recorded by a membership log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipAction {
    /// The employee joined the project roster.
    Added,
    /// The employee left the project roster.
    Removed,
}

impl MembershipAction {
    /// The `PostgreSQL` enum label for this action.
    pub const fn as_db_str(self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Removed => "REMOVED",
        }
    }
}

impl FromStr for MembershipAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADDED" => Ok(Self::Added),
            "REMOVED" => Ok(Self::Removed),
            other => Err(UnknownVariant {
                kind: "membership action",
                value: other.to_owned(),
            }),
        }
    }
}

impl core::fmt::Display for MembershipAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_db_str())
    }
}
