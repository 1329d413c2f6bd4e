//! Core NosqlHaus functionality
//!
//! This module contains the handle factory: it validates configuration up
//! front, builds the single client handle on first use and hands out
//! repositories that share it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cache_system::QueryCache;
use config::{ConfigError, HandleConfig, NosqlConfig};
use store_object::auth::provider_from_config;
use store_object::{
    AuthorizationProvider, EntityDefaults, EntityDefaultsRegistry, HandleConnector, NosqlEntity,
    NosqlHandle, NosqlRepository, PreparedStatement,
};
use tokio::sync::{Mutex, OnceCell};

use crate::errors::NosqlHausError;
use crate::user_agent::negotiate_user_agent;

/// Handle factory and repository entry point
///
/// Owns at most one client handle. The handle is created by the first call to
/// [`NosqlHaus::client`]; concurrent first callers wait for that construction
/// and all receive the same handle.
///
/// Once built, the handle owns the authorization provider it was given and
/// releases it when closed.
pub struct NosqlHaus {
    config: Arc<NosqlConfig>,
    handle_config: HandleConfig,
    auth: Arc<dyn AuthorizationProvider>,
    connector: Arc<dyn HandleConnector>,
    handle: OnceCell<Arc<dyn NosqlHandle>>,
    closed: AtomicBool,
    // Serializes handle construction against close; `true` once released
    released: Mutex<bool>,
    query_cache: QueryCache<PreparedStatement>,
    entity_defaults: EntityDefaultsRegistry,
}

impl std::fmt::Debug for NosqlHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NosqlHaus")
            .field("endpoint", &self.handle_config.endpoint)
            .field("user_agent", &self.handle_config.user_agent)
            .field("initialized", &self.is_initialized())
            .field("closed", &self.is_closed())
            .field("query_cache", &self.query_cache)
            .finish()
    }
}

impl NosqlHaus {
    /// Validate configuration and prepare the factory; no handle is built yet
    pub fn new(
        config: NosqlConfig,
        connector: Arc<dyn HandleConnector>,
    ) -> Result<Self, NosqlHausError> {
        config.validate()?;

        let mut handle_config = config.handle_config()?.clone();
        // Already rejected by validate()
        let Some(auth) = handle_config.auth.as_ref().map(provider_from_config) else {
            return Err(ConfigError::Invalid("Authorization provider is required".to_string()).into());
        };
        handle_config.user_agent = Some(negotiate_user_agent(handle_config.user_agent.as_deref()));

        let query_cache = QueryCache::from_config(&config.query_cache)?;

        debug_log!(
            "NosqlHaus configured for {:?} as {:?}",
            handle_config.endpoint,
            handle_config.user_agent
        );

        Ok(Self {
            config: Arc::new(config),
            handle_config,
            auth,
            connector,
            handle: OnceCell::new(),
            closed: AtomicBool::new(false),
            released: Mutex::new(false),
            query_cache,
            entity_defaults: EntityDefaultsRegistry::new(),
        })
    }

    /// Get the shared client handle, creating it on first use
    ///
    /// A failed construction leaves nothing cached, so the next call retries.
    /// Construction and [`NosqlHaus::close`] never overlap: a close issued
    /// while the handle is being built waits for it and then closes it.
    pub async fn client(&self) -> Result<Arc<dyn NosqlHandle>, NosqlHausError> {
        if self.is_closed() {
            return Err(NosqlHausError::Closed);
        }
        if let Some(handle) = self.handle.get() {
            return Ok(Arc::clone(handle));
        }

        let _released = self.released.lock().await;
        if self.is_closed() {
            return Err(NosqlHausError::Closed);
        }

        let handle = self
            .handle
            .get_or_try_init(move || async move {
                debug_log!("Connecting to {:?}", self.handle_config.endpoint);
                self.connector
                    .connect(&self.handle_config, Arc::clone(&self.auth))
                    .await
            })
            .await?;

        Ok(Arc::clone(handle))
    }

    /// Close the handle if one was created; safe to call repeatedly
    ///
    /// The factory refuses new work from the first call on. If the driver
    /// fails to close, the error is returned and a later call tries again.
    pub async fn close(&self) -> Result<(), NosqlHausError> {
        let mut released = self.released.lock().await;
        self.closed.store(true, Ordering::Release);
        if *released {
            trace_log!("NosqlHaus already closed");
            return Ok(());
        }

        match self.handle.get() {
            Some(handle) => {
                debug_log!("Closing handle for {:?}", self.handle_config.endpoint);
                handle.close().await?;
            }
            // No handle ever took ownership of the provider
            None => self.auth.close(),
        }
        self.query_cache.clear();
        *released = true;
        Ok(())
    }

    /// Register per-entity defaults; affects repositories created afterwards
    pub fn register_entity_defaults(&mut self, entity: impl Into<String>, defaults: EntityDefaults) {
        self.entity_defaults.register(entity, defaults);
    }

    /// Register defaults for an entity type under its entity name
    pub fn register_defaults_for<T: NosqlEntity>(&mut self, defaults: EntityDefaults) {
        self.register_entity_defaults(T::entity_name(), defaults);
    }

    /// Build a repository sharing this factory's handle and query cache
    pub async fn repository<T: NosqlEntity>(&self) -> Result<NosqlRepository<T>, NosqlHausError> {
        let handle = self.client().await?;
        let repository = NosqlRepository::new(
            handle,
            Arc::clone(&self.config),
            self.query_cache.clone(),
            &self.entity_defaults,
        )?;
        Ok(repository)
    }

    pub fn config(&self) -> &NosqlConfig {
        &self.config
    }

    /// Handle settings as handed to the connector, user agent included
    pub fn handle_config(&self) -> &HandleConfig {
        &self.handle_config
    }

    pub fn user_agent(&self) -> &str {
        self.handle_config.user_agent.as_deref().unwrap_or_default()
    }

    pub fn query_cache(&self) -> &QueryCache<PreparedStatement> {
        &self.query_cache
    }

    pub fn entity_defaults(&self) -> &EntityDefaultsRegistry {
        &self.entity_defaults
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
