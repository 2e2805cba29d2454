//! Configuration loading.
//!
//! Either from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://${PGUSER}@localhost/jobly"
//! max_pool_size = 8
//! ```
//!
//! or from the environment (`DATABASE_URL`, `JOBLY_POOL_MAX_SIZE`), after
//! loading a `.env` file if one exists.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "postgresql:///jobly";
const DEFAULT_MAX_POOL_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoblyConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
}

fn default_max_pool_size() -> usize {
    DEFAULT_MAX_POOL_SIZE
}

impl JoblyConfig {
    /// Read and validate a TOML config file. `${VAR}` references are expanded.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse and validate TOML config text. `${VAR}` references are expanded.
    pub fn from_toml(raw: &str) -> JoblyResult<Self> {
        let mut config: JoblyConfig = toml::from_str(raw)
            .map_err(|e| JoblyError::Config(format!("failed to parse config: {e}")))?;
        config.database.url = expand_env_vars(&config.database.url)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from `DATABASE_URL` / `JOBLY_POOL_MAX_SIZE`, reading `.env` first.
    pub fn from_env() -> JoblyResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(JoblyError::Config(format!("failed to load .env: {e}")));
            }
        }

        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_pool_size = match std::env::var("JOBLY_POOL_MAX_SIZE") {
            Ok(v) => v.trim().parse().map_err(|_| {
                JoblyError::Config(format!("JOBLY_POOL_MAX_SIZE is not a number: {v}"))
            })?,
            Err(_) => DEFAULT_MAX_POOL_SIZE,
        };

        let config = Self {
            database: DatabaseConfig { url, max_pool_size },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(JoblyError::Config("database.url must not be empty".into()));
        }
        if self.database.max_pool_size == 0 {
            return Err(JoblyError::Config("database.max_pool_size must be at least 1".into()));
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JoblyError::Config(format!(
                    "unterminated env var reference: ${{{key}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::Config("invalid env var reference: ${}".into()));
            }

            let v = std::env::var(&key).map_err(|_| {
                JoblyError::Config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
