//! Process configuration, read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `USE_PERSISTENT_STORES` | `false` | Use PostgreSQL instead of the in-memory store |
//! | `DATABASE_URL` | (required when persistent) | PostgreSQL connection string |
//! | `SESSION_TTL_MINUTES` | `1440` | Session lifetime, at most one year |
//! | `LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `BOOTSTRAP_SUPERADMIN_USERNAME` | `superadmin` | Account created on first start |
//! | `BOOTSTRAP_SUPERADMIN_PASSWORD` | `password123` | |
//! | `BOOTSTRAP_SUPERADMIN_EMAIL` | `super@admin.com` | |

use std::collections::HashMap;
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use siteerp_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 24 * 60;
/// One year.
const MAX_SESSION_TTL_MINUTES: i64 = 366 * 24 * 60;
const DEFAULT_SUPERADMIN_USERNAME: &str = "superadmin";
const DEFAULT_SUPERADMIN_PASSWORD: &str = "password123";
const DEFAULT_SUPERADMIN_EMAIL: &str = "super@admin.com";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required when USE_PERSISTENT_STORES=true")]
    Missing { name: &'static str },

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Where tenant data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres { database_url: String },
}

/// Superadmin account ensured at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAccount {
    pub username: String,
    pub password: String,
    pub email: String,
    /// True when the insecure built-in password is in use.
    pub default_password: bool,
}

impl core::fmt::Debug for BootstrapAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAccount")
            .field("username", &self.username)
            .field("password", &"***")
            .field("email", &self.email)
            .field("default_password", &self.default_password)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub persistence: Persistence,
    pub session_ttl: Duration,
    pub log_format: LogFormat,
    pub bootstrap: BootstrapAccount,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Read configuration from an explicit variable map (for tests).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let persistent = match var("USE_PERSISTENT_STORES") {
            None => false,
            Some(v) => v.parse::<bool>().map_err(|e| ConfigError::Invalid {
                name: "USE_PERSISTENT_STORES",
                message: e.to_string(),
            })?,
        };
        let persistence = if persistent {
            let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing {
                name: "DATABASE_URL",
            })?;
            Persistence::Postgres { database_url }
        } else {
            Persistence::InMemory
        };

        let ttl_minutes = match var("SESSION_TTL_MINUTES") {
            None => DEFAULT_SESSION_TTL_MINUTES,
            Some(v) => v.parse::<i64>().map_err(|e| ConfigError::Invalid {
                name: "SESSION_TTL_MINUTES",
                message: e.to_string(),
            })?,
        };
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_MINUTES",
                message: format!("must be between 1 and {MAX_SESSION_TTL_MINUTES}"),
            });
        }
        let session_ttl = Duration::minutes(ttl_minutes);

        let log_format = match var("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(v) => v.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                name: "LOG_FORMAT",
                message: e.to_string(),
            })?,
        };

        let password = var("BOOTSTRAP_SUPERADMIN_PASSWORD");
        let bootstrap = BootstrapAccount {
            username: var("BOOTSTRAP_SUPERADMIN_USERNAME")
                .unwrap_or_else(|| DEFAULT_SUPERADMIN_USERNAME.to_string()),
            default_password: password.is_none(),
            password: password.unwrap_or_else(|| DEFAULT_SUPERADMIN_PASSWORD.to_string()),
            email: var("BOOTSTRAP_SUPERADMIN_EMAIL")
                .unwrap_or_else(|| DEFAULT_SUPERADMIN_EMAIL.to_string()),
        };

        Ok(Self {
            bind_addr,
            persistence,
            session_ttl,
            log_format,
            bootstrap,
        })
    }
}
