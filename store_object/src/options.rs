//! Request option resolution
//!
//! Every request carries a timeout, a consistency and a durability. Each is
//! resolved independently: a repository override wins, then the entity's
//! registered default, then the global configuration default. A timeout of
//! zero means "not set".

use config::{Consistency, Durability, NosqlConfig, DEFAULT_REQUEST_TIMEOUT_MS};
use std::collections::HashMap;
use std::time::Duration;

/// Optional timeout / consistency / durability values for one layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout_ms: u64,
    pub consistency: Option<Consistency>,
    pub durability: Option<Durability>,
}

/// Per-entity defaults share the shape of repository overrides
pub type EntityDefaults = RequestOptions;

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = Some(durability);
        self
    }

    pub fn timeout(&self) -> Option<u64> {
        (self.timeout_ms > 0).then_some(self.timeout_ms)
    }

    pub fn is_empty(&self) -> bool {
        self.timeout().is_none() && self.consistency.is_none() && self.durability.is_none()
    }
}

/// Bottom layer of resolution, taken from the global configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalDefaults {
    pub timeout_ms: u64,
    pub consistency: Consistency,
    pub durability: Durability,
}

impl GlobalDefaults {
    pub fn from_config(config: &NosqlConfig) -> Self {
        Self {
            timeout_ms: config
                .handle
                .as_ref()
                .map(|h| h.request_timeout_ms)
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
            consistency: config.default_consistency,
            durability: config.default_durability,
        }
    }
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            consistency: Consistency::default(),
            durability: Durability::default(),
        }
    }
}

/// Values actually sent with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub timeout_ms: u64,
    pub consistency: Consistency,
    pub durability: Durability,
}

impl ResolvedOptions {
    /// Resolve `overrides > entity > global` field by field
    pub fn resolve(
        overrides: &RequestOptions,
        entity: Option<&EntityDefaults>,
        global: &GlobalDefaults,
    ) -> Self {
        let timeout_ms = overrides
            .timeout()
            .or_else(|| entity.and_then(|e| e.timeout()))
            .unwrap_or(global.timeout_ms);
        let consistency = overrides
            .consistency
            .or_else(|| entity.and_then(|e| e.consistency))
            .unwrap_or(global.consistency);
        let durability = overrides
            .durability
            .or_else(|| entity.and_then(|e| e.durability))
            .unwrap_or(global.durability);

        Self {
            timeout_ms,
            consistency,
            durability,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Per-entity defaults keyed by entity name
///
/// Filled in while entities are being registered, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct EntityDefaultsRegistry {
    defaults: HashMap<String, EntityDefaults>,
}

impl EntityDefaultsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the defaults for an entity
    pub fn register(&mut self, entity: impl Into<String>, defaults: EntityDefaults) {
        self.defaults.insert(entity.into(), defaults);
    }

    pub fn with(mut self, entity: impl Into<String>, defaults: EntityDefaults) -> Self {
        self.register(entity, defaults);
        self
    }

    pub fn get(&self, entity: &str) -> Option<&EntityDefaults> {
        self.defaults.get(entity)
    }

    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}
