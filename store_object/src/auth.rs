//! Authorization providers handed to the driver

use crate::errors::ClientError;
use config::AuthConfig;
use std::fmt::Debug;
use std::sync::Arc;

/// Token sent by [`SimulatedAuthProvider`] with every request
pub const SIMULATED_AUTHORIZATION: &str = "Bearer cloudsim";

/// Supplies the authorization header value for outgoing requests
pub trait AuthorizationProvider: Send + Sync + Debug {
    fn authorization_string(&self) -> Result<String, ClientError>;

    fn close(&self) {}
}

/// Fixed-token provider for local simulators; performs no authentication
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedAuthProvider;

impl AuthorizationProvider for SimulatedAuthProvider {
    fn authorization_string(&self) -> Result<String, ClientError> {
        Ok(SIMULATED_AUTHORIZATION.to_string())
    }
}

/// Provider for a pre-issued bearer token
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthorizationProvider for StaticTokenProvider {
    fn authorization_string(&self) -> Result<String, ClientError> {
        if self.token.trim().is_empty() {
            return Err(ClientError::Unauthorized("empty bearer token".to_string()));
        }
        Ok(format!("Bearer {}", self.token))
    }
}

/// Resolve the configured provider variant
pub fn provider_from_config(config: &AuthConfig) -> Arc<dyn AuthorizationProvider> {
    match config {
        AuthConfig::Simulated => Arc::new(SimulatedAuthProvider),
        AuthConfig::BearerToken { token } => Arc::new(StaticTokenProvider::new(token.clone())),
    }
}
