//! Runtime settings.
//!
//! Settings come either from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://${DB_USER}@localhost/jobly"
//! max_pool_size = 8
//!
//! [sql_log]
//! max_sql_length = 120
//! ```
//!
//! or from the process environment (`DATABASE_URL`, `JOBLY_MAX_POOL_SIZE`),
//! with a `.env` file loaded first when present.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    #[serde(default)]
    pub sql_log: SqlLogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqlLogSettings {
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: usize,
}

impl Default for SqlLogSettings {
    fn default() -> Self {
        Self {
            max_sql_length: default_max_sql_length(),
        }
    }
}

fn default_max_pool_size() -> usize {
    16
}

fn default_max_sql_length() -> usize {
    200
}

impl Settings {
    /// Read settings from a TOML file, expanding `${VAR}` references from the environment.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw, |key| std::env::var(key).ok())
    }

    /// Parse settings from TOML text, resolving `${VAR}` through `lookup`.
    pub fn from_toml_str(
        raw: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> JoblyResult<Self> {
        let mut settings: Settings = toml::from_str(raw)
            .map_err(|e| JoblyError::config(format!("failed to parse config: {e}")))?;
        settings.database.url = expand_env_vars_with(&settings.database.url, &lookup)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build settings from `DATABASE_URL` and `JOBLY_MAX_POOL_SIZE`.
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let url = lookup("DATABASE_URL")
            .ok_or_else(|| JoblyError::config("DATABASE_URL is not set"))?;
        let max_pool_size = match lookup("JOBLY_MAX_POOL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    JoblyError::config(format!(
                        "JOBLY_MAX_POOL_SIZE must be a positive integer, got '{raw}'"
                    ))
                })?,
            None => default_max_pool_size(),
        };

        let settings = Settings {
            database: DatabaseSettings { url, max_pool_size },
            sql_log: SqlLogSettings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(JoblyError::config("database.url must not be empty"));
        }
        if self.database.max_pool_size == 0 {
            return Err(JoblyError::config("database.max_pool_size must be at least 1"));
        }
        Ok(())
    }
}

fn expand_env_vars_with(
    input: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

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
                return Err(JoblyError::config(format!(
                    "unterminated env var reference: ${{{key}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::config("invalid env var reference: ${}"));
            }

            let value = lookup(&key).ok_or_else(|| {
                JoblyError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&value);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
