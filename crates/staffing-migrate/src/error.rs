//! Error types for the migration binary.

/// Top-level error for `staffing-migrate`.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: staffing_roster::ConfigError,
    },

    /// Connecting to or migrating the database failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: staffing_db::DbError,
    },
}
