use anyhow::Context;
use std::{str::FromStr, sync::Arc};

use crate::{auth::auth_service::AuthService, task::task_service::TaskService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub task_service: TaskService,
    pub auth_service: AuthService,
}

const DEFAULT_JWT_SECRET: &str = "development-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    /// Anything other than `development` is treated as production so that
    /// diagnostic detail stays hidden unless explicitly requested.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            _ => Ok(Environment::Production),
        }
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

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub client_url: Option<String>,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, falling back to the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            jwt_secret,
            jwt_expires_in_days: parse_or(&lookup, "JWT_EXPIRES_IN_DAYS", 7)?,
            client_url: lookup("CLIENT_URL").filter(|url| !url.trim().is_empty()),
            environment: lookup("APP_ENV")
                .map(|env| env.parse().unwrap_or(Environment::Production))
                .unwrap_or(Environment::Development),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/tasks")]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.jwt_expires_in_days, 7);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.client_url, None);
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_missing_database_url() {
        assert!(config_from(&[]).is_err());
    }

    #[test]
    fn test_malformed_port() {
        let result = config_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_parsing() {
        let config = config_from(&[("DATABASE_URL", "postgres://x"), ("APP_ENV", "production")]).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Production);
        assert!("Development".parse::<Environment>().unwrap().is_development());
    }
}
