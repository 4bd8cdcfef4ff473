//! Roster reconciliation for project staffing.
//!
//! Assigns employees to projects and keeps an append-only audit trail of
//! every membership change. Replacing a roster is a single all-or-nothing
//! unit of work: the project is resolved and locked, the desired employees
//! are resolved, the difference against the current roster is computed,
//! and the roster rows and log entries are written together or not at all.
//!
//! # Architecture
//!
//! ```text
//! ReconcileRequest
//!     |
//!     +-- validation          (explicit request checks)
//!     +-- RosterCoordinator   (one transaction per call)
//!         |-- ProjectResolver  (resolve + lock)
//!         |-- EmployeeResolver (all-or-nothing resolution)
//!         |-- reconcile        (pure set difference)
//!         |-- RosterStore      (membership rows)
//!         +-- AuditLogWriter   (append-only log)
//! ```
//!
//! Storage is pluggable through the traits in [`collaborators`] and
//! [`audit`]. [`memory::InMemoryRoster`] is a complete in-process backend;
//! the `staffing-db` crate provides the `PostgreSQL` one.
//!
//! # Modules
//!
//! - [`reconcile`] -- Roster set difference
//! - [`validation`] -- Request shape and duplicate handling
//! - [`audit`] -- Log entry construction and the writer trait
//! - [`collaborators`] -- Transaction, resolver, store, and reader traits
//! - [`coordinator`] -- The transactional write path
//! - [`history`] -- Roster reconstruction from the log
//! - [`memory`] -- In-process backend
//! - [`config`] -- YAML configuration
//! - [`error`] -- Shared error types

pub mod audit;
pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod memory;
pub mod reconcile;
pub mod validation;

// Re-export primary types for convenience.
pub use audit::{AuditLogWriter, LogContext, build_log_entries};
pub use collaborators::{
    EmployeeResolver, ProjectResolver, RosterReader, RosterStore, RosterTransaction,
    TransactionSource,
};
pub use config::{ConfigError, RosterConfig};
pub use coordinator::RosterCoordinator;
pub use error::{RosterError, RosterErrorKind};
pub use history::{replay_log, roster_as_of};
pub use memory::{InMemoryCoordinator, InMemoryRoster, InMemoryTransaction};
pub use reconcile::{RosterDiff, diff_roster};
pub use validation::{DuplicatePolicy, ReconcileRequest};
