//! `PostgreSQL` data layer for project rosters.
//!
//! Implements every storage seam of `staffing-roster` on top of [`sqlx`].
//! Reconciliations run in one database transaction with the project row
//! locked; reads go straight to the pool.
//!
//! # Tables
//!
//! ```text
//! projects ----------+
//!                    +-- project_employees  (roster join, PK project+employee)
//! employees ---------+
//!                    +-- membership_log     (append-only, triggers reject UPDATE/DELETE)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool and transactions
//! - [`project_store`] -- Project resolution with `FOR UPDATE`
//! - [`employee_store`] -- All-or-nothing employee resolution
//! - [`roster_store`] -- Membership row writes
//! - [`membership_log`] -- Log appends
//! - [`roster_reader`] -- Read-only joins and history
//! - [`rows`] -- Row types and decoding
//! - [`error`] -- Shared error types

pub mod employee_store;
pub mod error;
pub mod membership_log;
pub mod postgres;
pub mod project_store;
pub mod roster_reader;
pub mod roster_store;
pub mod rows;

use staffing_roster::{DuplicatePolicy, RosterCoordinator};

// Re-export primary types for convenience.
pub use employee_store::PgEmployeeResolver;
pub use error::DbError;
pub use membership_log::PgMembershipLog;
pub use postgres::{PgTransaction, PostgresPool};
pub use project_store::PgProjectResolver;
pub use roster_reader::PgRosterReader;
pub use roster_store::PgRosterStore;
pub use rows::{EmployeeRow, MembershipLogRow, ProjectRow};

/// A coordinator wired to `PostgreSQL` for every collaborator.
pub type PgRosterCoordinator = RosterCoordinator<
    PostgresPool,
    PgProjectResolver,
    PgEmployeeResolver,
    PgRosterStore,
    PgMembershipLog,
>;

impl PostgresPool {
    /// A coordinator that runs reconciliations on this pool.
    pub fn coordinator(&self, duplicate_policy: DuplicatePolicy) -> PgRosterCoordinator {
        RosterCoordinator::new(
            self.clone(),
            PgProjectResolver,
            PgEmployeeResolver,
            PgRosterStore,
            PgMembershipLog,
        )
        .with_duplicate_policy(duplicate_policy)
    }

    /// Read queries on this pool.
    pub const fn reader(&self) -> PgRosterReader<'_> {
        PgRosterReader::new(self.pool())
    }
}
