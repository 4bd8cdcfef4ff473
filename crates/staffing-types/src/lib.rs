//! Shared type definitions for project staffing.
//!
//! This crate is the single source of truth for the entities the roster
//! subsystem reads and writes. Persistence shapes live in `staffing-db`;
//! these are the domain shapes every other crate speaks.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Lifecycle status and membership action enumerations
//! - [`structs`] -- Projects, employees, memberships, and log entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{LifecycleStatus, MembershipAction, UnknownVariant};
pub use ids::{ActorId, EmployeeId, MembershipLogEntryId, ProjectId};
pub use structs::{Employee, Membership, MembershipLogEntry, Project, ProjectRoster};
