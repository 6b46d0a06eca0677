//! Error types for rate resolution and conversion

use thiserror::Error;

use super::rates::RequestType;

#[derive(Debug, Clone, Error)]
pub enum RatesError {
    #[error("API key not set")]
    MissingCredential,

    #[error("Connection to {backend} backend was not successful: {message}")]
    BackendConnection {
        backend: &'static str,
        message: String,
    },

    #[error("Invalid rate key '{0}': expected 'latest' or a YYYY-MM-DD date")]
    InvalidKey(String),

    #[error("Cannot request {request} rates under key '{key}'")]
    RequestMismatch {
        request: RequestType,
        key: String,
    },

    #[error("Failed to fetch {request} rates for '{key}': {message}")]
    UpstreamFetch {
        request: RequestType,
        key: String,
        message: String,
    },

    #[error("Failed to persist '{key}' to {backend} backend: {message}")]
    Persistence {
        backend: &'static str,
        key: String,
        message: String,
    },

    #[error("Unknown currency code: {0}")]
    UnknownCurrencyCode(String),

    #[error("Unable to resolve rates for conversion")]
    RateResolution(#[source] Box<RatesError>),
}

impl RatesError {
    pub(crate) fn connection(backend: &'static str, err: impl std::fmt::Display) -> Self {
        RatesError::BackendConnection {
            backend,
            message: err.to_string(),
        }
    }

    pub(crate) fn persistence(
        backend: &'static str,
        key: &str,
        err: impl std::fmt::Display,
    ) -> Self {
        RatesError::Persistence {
            backend,
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}
