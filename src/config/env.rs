// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Read database and runtime configuration from the process environment

use crate::errors::InitError;
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DB_HOST_VAR: &str = "DB_HOST_DEV";
pub const DB_PORT_VAR: &str = "DB_PORT_DEV";
pub const DB_NAME_VAR: &str = "DB_NAME_DEV";
pub const DB_USER_VAR: &str = "DB_USER_DEV";
pub const DB_PASSWORD_VAR: &str = "DB_PASSWORD_DEV";

const REDACTED: &str = "********";

/// Database connection settings
/// DOCUMENTATION: All five values are required, no defaults are substituted
/// Read once per initialization attempt, never persisted
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: String,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Load database settings from the process environment
    pub fn from_env() -> Result<Self, InitError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load database settings through an arbitrary lookup
    /// DOCUMENTATION: A value that is absent or empty counts as missing.
    /// Every missing name is reported, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match lookup(name) {
            Some(value) if !value.is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let config = DbConfig {
            host: read(DB_HOST_VAR),
            port: read(DB_PORT_VAR),
            dbname: read(DB_NAME_VAR),
            user: read(DB_USER_VAR),
            password: read(DB_PASSWORD_VAR),
        };

        if !missing.is_empty() {
            return Err(InitError::MissingConfig { missing });
        }

        Ok(config)
    }

    /// Key/value connection descriptor with the password masked
    /// DOCUMENTATION: This is the only form of the descriptor that gets logged
    pub fn descriptor(&self) -> String {
        format!(
            "host={} user={} password={} port={} database={}",
            self.host, self.user, REDACTED, self.port, self.dbname
        )
    }
}

impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Function runtime configuration
/// DOCUMENTATION: Everything the host process needs besides the database
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub server_address: String,

    /// Listen port, set by the platform through PORT (default 8080)
    pub server_port: u16,

    /// Environment: development, staging, production (default production)
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Explicit env file for local development (ENV_FILE)
    pub env_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load runtime configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load runtime configuration through an arbitrary lookup
    /// DOCUMENTATION: An unset ENVIRONMENT means a deployed instance, so the
    /// .env file is only read when development is asked for explicitly
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        AppConfig {
            server_address: lookup("SERVER_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),

            server_port: lookup("PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(8080),

            environment: lookup("ENVIRONMENT")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "production".to_string()),

            log_level: lookup("LOG_LEVEL").unwrap_or_default(),

            env_file: lookup("ENV_FILE")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Local development reads a .env file, deployed instances do not
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}
