//! Configuration management utilities
//!
//! Settings are read through an [`EnvSource`] so that configuration parsing can
//! be exercised against a fixed map in tests instead of the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A required variable is not set or is blank
    #[error("{0} is not set")]
    Missing(String),

    /// A variable is set but could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

fn process_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// A source of configuration values keyed by variable name
pub struct EnvSource<F = fn(&str) -> Option<String>> {
    lookup: F,
}

impl EnvSource {
    /// Read from the process environment
    pub fn process() -> Self {
        Self {
            lookup: process_lookup,
        }
    }
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Read through an arbitrary lookup function
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Value of `key`, treating blank values as unset
    pub fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// First non-blank value among `keys`
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.optional(key))
    }

    /// Value of `key`, failing when it is unset or blank
    pub fn required(&self, key: &str) -> Result<String, EnvError> {
        self.optional(key)
            .ok_or_else(|| EnvError::Missing(key.to_string()))
    }

    /// Parsed value of `key`, or `default` when unset
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, EnvError> {
        match self.optional(key) {
            Some(value) => value.parse().map_err(|_| EnvError::Invalid {
                key: key.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }
}

/// Load a `.env` file from the working directory if one exists
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}
