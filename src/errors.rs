// src/errors.rs

// error handling for the api limiter

// dependencies
use thiserror::Error;

use crate::clock::ClockError;

/// Errors raised while building rules or resolving a call to a limiter.
///
/// Resolution errors are always returned before any window state is touched.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ApiLimiterError {
    #[error("API name cannot be absent")]
    MissingApiName,

    #[error("clients cannot be absent")]
    MissingClients,

    #[error("client cannot be absent for API {api}")]
    MissingClient { api: String },

    #[error("API {api} not registered")]
    ApiNotRegistered { api: String },

    #[error("client {client} not found for API {api}")]
    ClientNotFound { client: String, api: String },

    #[error("clock error: {0}")]
    Clock(#[from] ClockError),
}

/// Coarse classification of an [`ApiLimiterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Clock,
}

impl ApiLimiterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiLimiterError::MissingApiName
            | ApiLimiterError::MissingClients
            | ApiLimiterError::MissingClient { .. } => ErrorKind::InvalidArgument,
            ApiLimiterError::ApiNotRegistered { .. } | ApiLimiterError::ClientNotFound { .. } => {
                ErrorKind::NotFound
            }
            ApiLimiterError::Clock(_) => ErrorKind::Clock,
        }
    }
}

/// Result type alias for api limiter operations.
pub type Result<T> = std::result::Result<T, ApiLimiterError>;
