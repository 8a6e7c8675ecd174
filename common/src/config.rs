//! Application configuration.
//!
//! Resolved once at startup from environment variables into an immutable
//! [`AppConfig`]. Missing variables fall back to defaults; nothing here fails.

use std::collections::HashMap;

/// Default CORS origin list outside production.
pub const DEV_CORS_ORIGINS: &str = "*";

/// Default CORS origin list in production. Must never be a wildcard.
pub const PROD_CORS_ORIGINS: &str = "http://your-domain.com";

const DEFAULT_MYSQL_PORT: u16 = 3306;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8000;

/// Deployment profile, selected by the `ENV` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// `ENV=production` selects production; anything else is development.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Credentials and address of the MySQL server.
#[derive(Clone)]
pub struct MySqlSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Upper bound on the connection handshake, in seconds.
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// MySQL connection settings.
    pub mysql: MySqlSettings,
    /// Origins allowed by CORS. `*` means any origin.
    pub cors_origins: Vec<String>,
    /// Active deployment profile.
    pub environment: Environment,
    /// Listener address.
    pub host: String,
    /// Listener port.
    pub port: u16,
    /// Optional per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, or `None` when unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_flag(lookup("ENV").as_deref());
        let default_origins = if environment.is_production() {
            PROD_CORS_ORIGINS
        } else {
            DEV_CORS_ORIGINS
        };
        let cors_origins = parse_origins(
            &lookup("CORS_ORIGINS").unwrap_or_else(|| default_origins.to_string()),
        );

        let mysql = MySqlSettings {
            user: lookup("MYSQL_USER").unwrap_or_else(|| "root".to_string()),
            password: lookup("MYSQL_PASSWORD").unwrap_or_default(),
            host: lookup("MYSQL_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&lookup, "MYSQL_PORT", DEFAULT_MYSQL_PORT),
            connect_timeout_secs: parse_or(
                &lookup,
                "MYSQL_CONNECT_TIMEOUT",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        };

        Self {
            mysql,
            cors_origins,
            environment,
            host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS").and_then(|raw| {
                let parsed = raw.trim().parse::<u64>().ok();
                if parsed.is_none() {
                    tracing::warn!(key = "REQUEST_TIMEOUT_SECS", value = %raw, "ignoring invalid value");
                }
                parsed
            }),
        }
    }

    /// Interactive API documentation is only served outside production.
    pub fn docs_enabled(&self) -> bool {
        !self.environment.is_production()
    }

    /// Whether the origin list admits any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    /// Listener address as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Splits a comma-separated origin list, dropping blank entries.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        None => default,
    }
}

/// Loads `.env` from the working directory (best-effort, no error if missing).
///
/// Variables already present in the environment win over the file.
pub fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if std::env::var(&key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

/// Parses `KEY=VALUE` lines, skipping blanks and `#` comments.
/// Surrounding single or double quotes on values are stripped.
pub fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
