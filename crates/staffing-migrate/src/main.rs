//! Schema migration binary for the staffing roster database.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `STAFFING_CONFIG` (default
//!    `staffing-config.yaml`; a missing file means defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL`
//! 4. Apply pending migrations
//! 5. Close the pool

mod error;

use std::path::Path;

use staffing_db::PostgresPool;
use staffing_roster::RosterConfig;
use staffing_roster::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::MigrateError;

/// Config file used when `STAFFING_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "staffing-config.yaml";

#[tokio::main]
async fn main() -> Result<(), MigrateError> {
    let config = load_config()?;
    init_tracing(&config.logging);

    info!(
        max_connections = config.database.max_connections,
        duplicate_policy = ?config.reconciliation.duplicate_policy,
        "Configuration loaded"
    );

    let pool = PostgresPool::connect(&config.database).await?;
    pool.run_migrations().await?;
    pool.close().await;

    info!("staffing-migrate finished");
    Ok(())
}

/// Load the YAML config, falling back to defaults (plus `DATABASE_URL`)
/// when the file does not exist.
fn load_config() -> Result<RosterConfig, MigrateError> {
    let path = std::env::var("STAFFING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let path = Path::new(&path);

    if path.exists() {
        return Ok(RosterConfig::from_file(path)?);
    }

    let mut config = RosterConfig::default();
    config.database.apply_env_overrides();
    Ok(config)
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
