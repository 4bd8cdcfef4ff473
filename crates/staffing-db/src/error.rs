//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors. At the collaborator boundary every [`DbError`] becomes a
//! [`RosterError::Persistence`], so callers of the coordinator see one
//! error type regardless of backend.

use staffing_roster::RosterError;
use staffing_types::UnknownVariant;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A column held a value the domain types cannot represent.
    #[error("decode error: {0}")]
    Decode(#[from] UnknownVariant),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for RosterError {
    fn from(err: DbError) -> Self {
        Self::Persistence(err.to_string())
    }
}
