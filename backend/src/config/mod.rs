//! Application configuration management

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::graphql::SchemaLimits;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/fruits.db";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite connection URL (`sqlite:` prefix added to bare paths)
    pub database_url: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// Insert demo data into an empty database at startup
    pub seed_demo_data: bool,

    /// Query depth and complexity ceilings
    pub schema_limits: SchemaLimits,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = lookup("DATABASE_PATH")
            .or_else(|| lookup("DATABASE_URL"))
            .map(|raw| normalize_database_url(&raw))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let defaults = SchemaLimits::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: parse_or(&lookup, "PORT", 3001)?,

            database_url,

            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,

            seed_demo_data: lookup("SEED_DEMO_DATA")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),

            schema_limits: SchemaLimits {
                depth: parse_or(&lookup, "GRAPHQL_DEPTH_LIMIT", defaults.depth)?,
                complexity: parse_or(&lookup, "GRAPHQL_COMPLEXITY_LIMIT", defaults.complexity)?,
            },
        })
    }

    /// Address to bind the HTTP listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// File backing the database, or None for in-memory databases
    pub fn database_file(&self) -> Option<PathBuf> {
        let path = self
            .database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

fn normalize_database_url(raw: &str) -> String {
    if raw.starts_with("sqlite:") {
        raw.to_string()
    } else {
        format!("sqlite:{}", raw)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
        assert_eq!(config.database_url, "sqlite:./data/fruits.db");
        assert_eq!(config.database_file(), Some(PathBuf::from("./data/fruits.db")));
        assert_eq!(config.database_max_connections, 10);
        assert!(!config.seed_demo_data);
        assert_eq!(config.schema_limits.depth, 10);
        assert_eq!(config.schema_limits.complexity, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("DATABASE_PATH", "/tmp/fruits.db"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("SEED_DEMO_DATA", "1"),
            ("GRAPHQL_DEPTH_LIMIT", "4"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite:/tmp/fruits.db");
        assert!(config.seed_demo_data);
        assert_eq!(config.schema_limits.depth, 4);

        let memory = self::config(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(memory.database_file(), None);
    }

    #[test]
    fn test_invalid_port() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
