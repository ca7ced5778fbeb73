//! Cluster configuration handed to the transport connector.
//!
//! The layer itself only validates these values; they are passed through
//! unmodified when the shared transport is built.

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use derive_more::Display;
use serde::Deserialize;
use std::fmt;
use thiserror::Error as ThisError;

///
/// ClusterConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterConfig {
    pub contact_points: Vec<String>,
    pub keyspace: String,
    pub cluster_name: Option<String>,
    pub credentials: Option<Credentials>,
    pub pool: PoolConfig,
    pub query: QueryConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            contact_points: vec!["127.0.0.1".to_string()],
            keyspace: String::new(),
            cluster_name: None,
            credentials: None,
            pool: PoolConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contact_points.is_empty() {
            return Err(ConfigError::Invalid {
                message: "at least one contact point is required".to_string(),
            });
        }
        if self.keyspace.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "keyspace must be set".to_string(),
            });
        }
        if self.query.fetch_size == 0 {
            return Err(ConfigError::Invalid {
                message: "fetch_size must be positive".to_string(),
            });
        }

        self.pool.validate()
    }
}

///
/// Credentials
///

#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

///
/// PoolConfig
/// Per-host connection pool sizing.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    pub core_connections_local: u32,
    pub max_connections_local: u32,
    pub core_connections_remote: u32,
    pub max_connections_remote: u32,
    pub max_requests_per_local_connection: u32,
    pub max_requests_per_remote_connection: u32,
    pub heartbeat_interval_secs: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_connections_local: 4,
            max_connections_local: 8,
            core_connections_remote: 1,
            max_connections_remote: 4,
            max_requests_per_local_connection: 1024,
            max_requests_per_remote_connection: 512,
            heartbeat_interval_secs: 30,
        }
    }
}

impl PoolConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.core_connections_local > self.max_connections_local {
            return Err(ConfigError::Invalid {
                message: format!(
                    "local pool core size {} exceeds max size {}",
                    self.core_connections_local, self.max_connections_local
                ),
            });
        }
        if self.core_connections_remote > self.max_connections_remote {
            return Err(ConfigError::Invalid {
                message: format!(
                    "remote pool core size {} exceeds max size {}",
                    self.core_connections_remote, self.max_connections_remote
                ),
            });
        }

        Ok(())
    }
}

///
/// QueryConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub consistency: Consistency,
    pub default_idempotence: bool,
    pub fetch_size: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            consistency: Consistency::LocalOne,
            default_idempotence: false,
            fetch_size: 5000,
        }
    }
}

///
/// Consistency
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consistency {
    #[display("ANY")]
    Any,
    #[display("ONE")]
    One,
    #[display("TWO")]
    Two,
    #[display("THREE")]
    Three,
    #[display("QUORUM")]
    Quorum,
    #[display("ALL")]
    All,
    #[display("LOCAL_QUORUM")]
    LocalQuorum,
    #[display("EACH_QUORUM")]
    EachQuorum,
    #[display("SERIAL")]
    Serial,
    #[display("LOCAL_SERIAL")]
    LocalSerial,
    #[display("LOCAL_ONE")]
    LocalOne,
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("unable to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Config, err.to_string())
    }
}

///
/// TESTS
///
