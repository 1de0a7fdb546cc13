//! # Hagg Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`server`]: Listen address and mount prefix
//! - [`session`]: Session cookie, TTL and storage backend
//! - [`database`]: User repository connection
//! - [`casbin`]: Policy engine model and policy files
//!
//! Every section reads through a lookup function so tests can feed a map
//! instead of touching the process environment.
//!
//! # Example
//!
//! ```ignore
//! use hagg_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! println!("listening on {}", config.server.addr());
//! ```

pub mod casbin;
pub mod database;
pub mod server;
pub mod session;

pub use casbin::CasbinConfig;
pub use database::DatabaseConfig;
pub use server::ServerConfig;
pub use session::{SessionConfig, SessionStoreKind};

use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(u16),

    #[error("BASE_PATH must start with '/', got {0:?}")]
    InvalidBasePath(String),

    #[error("SESSION_MAX_AGE_SECS must be greater than zero")]
    ZeroSessionTtl,

    #[error("unknown SESSION_STORE {0:?} (expected \"memory\" or \"redis\")")]
    UnknownStore(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} is not a valid number: {1:?}")]
    InvalidNumber(&'static str, String),
}

/// Reads a numeric variable; unset or blank takes `default`, anything else must parse.
pub(crate) fn parse_number<F, T>(
    lookup: &F,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    if raw.trim().is_empty() {
        return Ok(default);
    }

    let parsed = raw.trim().parse();
    parsed.map_err(|_| ConfigError::InvalidNumber(var, raw))
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub database: DatabaseConfig,
    pub casbin: CasbinConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            server: ServerConfig::from_lookup(&lookup)?,
            session: SessionConfig::from_lookup(&lookup)?,
            database: DatabaseConfig::from_lookup(&lookup),
            casbin: CasbinConfig::from_lookup(&lookup),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort(self.server.port));
        }

        if !self.server.base_path.starts_with('/') {
            return Err(ConfigError::InvalidBasePath(self.server.base_path.clone()));
        }

        if self.session.max_age_secs == 0 {
            return Err(ConfigError::ZeroSessionTtl);
        }

        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::Empty("SESSION_COOKIE_NAME"));
        }

        if self.casbin.model_path.as_os_str().is_empty() {
            return Err(ConfigError::Empty("CASBIN_MODEL"));
        }

        if self.casbin.policy_path.as_os_str().is_empty() {
            return Err(ConfigError::Empty("CASBIN_POLICY"));
        }

        Ok(())
    }
}
