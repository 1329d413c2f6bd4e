//! Request option enums shared by configuration and repositories
//!
//! Values serialize with their wire names (`EVENTUAL`, `COMMIT_NO_SYNC`, ...)
//! and parse case-insensitively from strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Read consistency requested from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consistency {
    #[default]
    Eventual,
    Absolute,
}

/// Write durability requested from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Durability {
    #[default]
    CommitNoSync,
    CommitWriteNoSync,
    CommitSync,
}

/// How table throughput is billed when tables are created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    #[default]
    Provisioned,
    OnDemand,
}

impl Consistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Consistency::Eventual => "EVENTUAL",
            Consistency::Absolute => "ABSOLUTE",
        }
    }
}

impl Durability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Durability::CommitNoSync => "COMMIT_NO_SYNC",
            Durability::CommitWriteNoSync => "COMMIT_WRITE_NO_SYNC",
            Durability::CommitSync => "COMMIT_SYNC",
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consistency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EVENTUAL" => Ok(Consistency::Eventual),
            "ABSOLUTE" => Ok(Consistency::Absolute),
            _ => Err(ConfigError::Invalid(format!(
                "Unknown consistency '{}': expected EVENTUAL or ABSOLUTE",
                s
            ))),
        }
    }
}

impl FromStr for Durability {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMMIT_NO_SYNC" => Ok(Durability::CommitNoSync),
            "COMMIT_WRITE_NO_SYNC" => Ok(Durability::CommitWriteNoSync),
            "COMMIT_SYNC" => Ok(Durability::CommitSync),
            _ => Err(ConfigError::Invalid(format!(
                "Unknown durability '{}': expected COMMIT_NO_SYNC, COMMIT_WRITE_NO_SYNC or COMMIT_SYNC",
                s
            ))),
        }
    }
}
