//! Database primitives: environment-driven settings, connection setup and the
//! employee record store.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::info;

pub mod employees;

pub use employees::{DbEmployeeStore, EmployeeStore, NewEmployee};

/// Shared connection pool handle.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("persistence error: {0}")]
    Persistence(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 8;

/// Connection settings resolved from the environment.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    env_key: String,
    max_connections: u32,
    connect_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self::new("DATABASE_URL")
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Reads `DATABASE_MAX_CONNECTIONS` and `DATABASE_CONNECT_TIMEOUT_SECS`,
    /// keeping the defaults for missing or unparsable values.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(max) = env_parse::<u32>("DATABASE_MAX_CONNECTIONS").filter(|v| *v > 0) {
            settings.max_connections = max;
        }
        if let Some(secs) = env_parse::<u64>("DATABASE_CONNECT_TIMEOUT_SECS") {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        settings
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn database_url(&self) -> DbResult<String> {
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl(self.env_key.clone()))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}

/// Open a pool using the URL named by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    connect_url(&url, settings).await
}

/// Open a pool for an explicit URL, applying the pool limits from `settings`.
pub async fn connect_url(url: &str, settings: &DatabaseSettings) -> DbResult<DbPool> {
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(settings.connect_timeout)
        .sqlx_logging(false);
    let pool = Database::connect(options).await?;
    info!(
        backend = ?pool.get_database_backend(),
        max_connections = settings.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_names_the_variable() {
        let settings = DatabaseSettings::new("EMPLOYEE_DB_URL_THAT_IS_NEVER_SET");
        let err = settings.database_url().unwrap_err();
        assert!(matches!(err, DbError::MissingUrl(ref key) if key == "EMPLOYEE_DB_URL_THAT_IS_NEVER_SET"));
        assert!(err.to_string().contains("EMPLOYEE_DB_URL_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn max_connections_never_drops_to_zero() {
        let settings = DatabaseSettings::default().with_max_connections(0);
        assert_eq!(settings.max_connections(), 1);
        assert_eq!(
            settings.connect_timeout(),
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );
    }

    #[tokio::test]
    async fn connect_url_opens_sqlite_memory() {
        let settings = DatabaseSettings::default().with_max_connections(1);
        let pool = connect_url("sqlite::memory:", &settings).await.unwrap();
        assert_eq!(
            pool.get_database_backend(),
            sea_orm::DatabaseBackend::Sqlite
        );
    }
}
