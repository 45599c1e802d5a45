// Application configuration loaded from the environment

use std::collections::HashMap;
use thiserror::Error;

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_SWEEP_SECS: u64 = 300;
/// One year; keeps `iat + ttl` far from overflow
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub revocation_sweep_secs: u64,
    /// No URL means users are kept in memory
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET")
            .ok_or(ConfigError::Missing("JWT_SECRET"))?
            .to_string();

        let token_ttl_secs = match get("TOKEN_TTL_SECS") {
            Some(raw) => parse_positive("TOKEN_TTL_SECS", raw)?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };
        if token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                value: token_ttl_secs.to_string(),
                reason: "must not exceed one year",
            });
        }

        let revocation_sweep_secs = match get("REVOCATION_SWEEP_SECS") {
            Some(raw) => parse_positive::<u64>("REVOCATION_SWEEP_SECS", raw)?,
            None => DEFAULT_SWEEP_SECS,
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw.to_string(),
                reason: "not a port number",
            })?,
            None => 8080,
        };

        Ok(Self {
            jwt_secret,
            token_ttl_secs,
            revocation_sweep_secs,
            database_url: get("DATABASE_URL").map(str::to_string),
            host: get("HOST").unwrap_or("0.0.0.0").to_string(),
            port,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected a positive integer",
        }),
    }
}
