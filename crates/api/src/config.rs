//! Process configuration, read once at startup.

use chrono::Duration;
use thiserror::Error;

use rogerbank_auth::DEFAULT_TOKEN_TTL_SECS;
use rogerbank_statement::Locale;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_JWT_SECRET: &str = "dev-secret";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var} ('{value}'): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable application configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub cors_origin: String,
    pub statement_locale: Locale,
}

impl AppConfig {
    /// In-memory configuration with defaults everywhere but the secret.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            statement_locale: Locale::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let mut config = Self::in_memory(jwt_secret);
        config.database_url = get("DATABASE_URL");

        if let Some(v) = get("PORT") {
            config.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse_var("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("TOKEN_TTL_SECS") {
            let secs: i64 = parse_var("TOKEN_TTL_SECS", &v)?;
            if secs <= 0 {
                return Err(invalid("TOKEN_TTL_SECS", &v, "must be positive"));
            }
            config.token_ttl = Duration::seconds(secs);
        }
        if let Some(v) = get("CORS_ORIGIN") {
            config.cors_origin = v.trim().to_string();
        }
        if let Some(v) = get("STATEMENT_LOCALE") {
            config.statement_locale = v
                .parse()
                .map_err(|reason| invalid("STATEMENT_LOCALE", &v, reason))?;
        }

        Ok(config)
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("database", &self.database_url.as_ref().map(|_| "<set>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("token_ttl", &self.token_ttl)
            .field("cors_origin", &self.cors_origin)
            .field("statement_locale", &self.statement_locale)
            .finish_non_exhaustive()
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(var, value, e.to_string()))
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}
