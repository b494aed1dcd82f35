//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS};
use crate::{ServiceError, ServiceResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_url: String,
    max_connections: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(database_url: String, max_connections: u32) -> ServiceResult<Self> {
        if database_url.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "database_url cannot be empty".into(),
            ));
        }
        if max_connections == 0 {
            return Err(ServiceError::InvalidInput(
                "max_connections must be at least 1".into(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

/// Resolve the database URL from an optional `DATABASE_URL` value.
pub fn database_url_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned())
}

/// Parse an optional `DB_MAX_CONNECTIONS` value.
pub fn max_connections_from_env_value(value: Option<String>) -> ServiceResult<u32> {
    let Some(raw) = value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) else {
        return Ok(DEFAULT_MAX_CONNECTIONS);
    };

    raw.parse::<u32>().map_err(|_| {
        ServiceError::InvalidInput(format!(
            "DB_MAX_CONNECTIONS must be a positive integer, got '{raw}'"
        ))
    })
}
