//! 连接工厂
//!
//! 每个请求打开一条独立的 MySQL 连接，执行完一个工作单元后关闭，不做连接池。

use std::time::Duration;

use common::config::MySqlSettings;
use common::errors::{AppError, AppResult};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

/// Connection descriptor for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
}

impl ConnectionTarget {
    /// Derives a target from the configured server plus an optional database.
    /// An empty database name is treated as absent.
    pub fn new(settings: &MySqlSettings, database: Option<&str>) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            user: settings.user.clone(),
            password: settings.password.clone(),
            database: database.filter(|db| !db.is_empty()).map(String::from),
        }
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password);
        let options = match &self.database {
            Some(database) => options.database(database),
            None => options,
        };
        // statements are traced by the service layer
        options.disable_statement_logging()
    }
}

/// Renders the DSN with the password masked.
impl std::fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mysql://{}:***@{}:{}", self.user, self.host, self.port)?;
        if let Some(database) = &self.database {
            write!(f, "/{}", database)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConnectionTarget({})", self)
    }
}

/// Opens short-lived connections to the configured server.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    settings: MySqlSettings,
}

impl ConnectionFactory {
    pub fn new(settings: MySqlSettings) -> Self {
        Self { settings }
    }

    pub fn target(&self, database: Option<&str>) -> ConnectionTarget {
        ConnectionTarget::new(&self.settings, database)
    }

    /// Opens one connection, optionally bound to `database`.
    ///
    /// # Errors
    /// Returns `AppError::Connection` when the handshake fails or does not
    /// finish within the configured connect timeout.
    pub async fn open(&self, database: Option<&str>) -> AppResult<MySqlConnection> {
        let target = self.target(database);
        let timeout = Duration::from_secs(self.settings.connect_timeout_secs);
        tracing::debug!(dsn = %target, "opening connection");

        match tokio::time::timeout(timeout, MySqlConnection::connect_with(&target.connect_options())).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => {
                tracing::warn!(dsn = %target, error = %e, "connection failed");
                Err(AppError::Connection(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(dsn = %target, timeout_secs = timeout.as_secs(), "connection timed out");
                Err(AppError::Connection(format!(
                    "timed out after {}s connecting to {}",
                    timeout.as_secs(),
                    target
                )))
            }
        }
    }
}

/// Closes a connection once its unit of work is done.
pub async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "error while closing connection");
    }
}
