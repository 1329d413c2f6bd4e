use thiserror::Error;

/// Failures reported by the driver behind a [`crate::NosqlHandle`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Handle is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Timeout during {operation} after {timeout_ms} ms")]
    Timeout {
        operation: String,
        timeout_ms: u64,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected response to {operation}: {response}")]
    UnexpectedResponse {
        operation: String,
        response: String,
    },

    #[error("Request error during {operation}: {message}")]
    Request { operation: String, message: String },

    #[error("Handle is closed")]
    Closed,
}

impl RepositoryError {
    /// Map a driver failure, keeping the failure kind distinct
    pub fn from_client(operation: &str, error: ClientError) -> Self {
        match error {
            ClientError::Timeout(timeout_ms) => RepositoryError::Timeout {
                operation: operation.to_string(),
                timeout_ms,
            },
            ClientError::Unauthorized(message) => RepositoryError::Unauthorized(message),
            ClientError::Unavailable(message) => RepositoryError::Unavailable(message),
            ClientError::Request(message) => RepositoryError::Request {
                operation: operation.to_string(),
                message,
            },
            ClientError::Closed => RepositoryError::Closed,
        }
    }

    pub fn unexpected(operation: &str, response: &crate::Response) -> Self {
        RepositoryError::UnexpectedResponse {
            operation: operation.to_string(),
            response: response.kind().to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RepositoryError::Timeout { .. })
    }
}

impl From<crate::validation::ValidationError> for RepositoryError {
    fn from(error: crate::validation::ValidationError) -> Self {
        RepositoryError::Validation(error.to_string())
    }
}

impl From<config::ConfigError> for RepositoryError {
    fn from(error: config::ConfigError) -> Self {
        RepositoryError::Validation(error.to_string())
    }
}
