//! `PostgreSQL` connection pool and transactions.
//!
//! Queries across this crate are built at runtime and always bound with
//! parameters, so no database is needed at build time.
//!
//! [`PostgresPool`] is the coordinator's [`TransactionSource`]: each
//! reconciliation runs in one [`PgTransaction`], which rolls back when
//! dropped uncommitted.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use staffing_roster::config::DatabaseConfig;
use staffing_roster::{RosterError, RosterTransaction, TransactionSource};

use crate::error::DbError;

/// Pooled connections to the roster database.
#[derive(Debug, Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Open a pool sized and timed by the `database` config section.
    ///
    /// # Errors
    ///
    /// - [`DbError::Config`] if `config.url` is not a valid connection URL.
    /// - [`DbError::Postgres`] if no connection can be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("Invalid database URL: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to roster database"
        );

        Ok(Self { pool })
    }

    /// Open a pool on `url` with default sizing.
    ///
    /// # Errors
    ///
    /// See [`PostgresPool::connect`].
    pub async fn connect_url(url: &str) -> Result<Self, DbError> {
        let config = DatabaseConfig {
            url: url.to_owned(),
            ..DatabaseConfig::default()
        };
        Self::connect(&config).await
    }

    /// Bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if a migration fails to apply.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Roster schema migrated");
        Ok(())
    }

    /// The underlying sqlx pool.
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Wait for checked-out connections to return, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Roster database pool closed");
    }
}

/// One open `PostgreSQL` transaction.
///
/// Dropping it without [`RosterTransaction::commit`] rolls back.
pub struct PgTransaction(Transaction<'static, Postgres>);

impl core::fmt::Debug for PgTransaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PgTransaction").finish_non_exhaustive()
    }
}

impl PgTransaction {
    /// The connection every statement in this transaction runs on.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.0
    }
}

impl RosterTransaction for PgTransaction {
    async fn commit(self) -> Result<(), RosterError> {
        self.0.commit().await.map_err(DbError::from)?;
        Ok(())
    }
}

impl TransactionSource for PostgresPool {
    type Tx = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, RosterError> {
        let tx = self.pool.begin().await.map_err(DbError::from)?;
        Ok(PgTransaction(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_url_is_a_config_error() {
        let config = DatabaseConfig {
            url: String::from("not a connection url"),
            ..DatabaseConfig::default()
        };
        let result = PostgresPool::connect(&config).await;
        assert!(matches!(result, Err(DbError::Config(_))));
    }
}
